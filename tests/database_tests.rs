//! Database model behavior against a real SQLite file.

mod common;

use common::*;
use shopfront_bot::database::models::{CartLine, Order, OrderItem, Product, Review, User};

#[tokio::test]
async fn test_user_creation_and_retrieval() {
    let h = setup().await;

    let user = User::create(&h.db.pool, 1001, "Alice", Some("+998901234567"), None, "ru")
        .await
        .unwrap();
    assert_eq!(user.telegram_id, 1001);
    assert_eq!(user.name, "Alice");
    assert_eq!(user.phone.as_deref(), Some("+998901234567"));
    assert_eq!(user.email, None);
    assert!(!user.is_admin);

    let found = User::find_by_telegram_id(&h.db.pool, 1001).await.unwrap();
    assert!(found.is_some());
    assert_eq!(found.unwrap().id, user.id);

    let missing = User::find_by_telegram_id(&h.db.pool, 9999).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_duplicate_telegram_id_rejected() {
    let h = setup().await;

    User::create(&h.db.pool, 1001, "Alice", None, None, "ru")
        .await
        .unwrap();
    let duplicate = User::create(&h.db.pool, 1001, "Alice again", None, None, "ru").await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn test_ensure_admin_promotes_and_creates() {
    let h = setup().await;

    // Creates a fresh admin row
    User::ensure_admin(&h.db.pool, 2002, "Boss").await.unwrap();
    let boss = User::find_by_telegram_id(&h.db.pool, 2002)
        .await
        .unwrap()
        .unwrap();
    assert!(boss.is_admin);

    // Promotes an existing user
    seed_user(&h.db, 1001, "Alice").await;
    User::ensure_admin(&h.db.pool, 1001, "Alice").await.unwrap();
    let alice = User::find_by_telegram_id(&h.db.pool, 1001)
        .await
        .unwrap()
        .unwrap();
    assert!(alice.is_admin);

    assert_eq!(
        User::admin_telegram_ids(&h.db.pool).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn test_cart_add_merges_quantities() {
    let h = setup().await;
    let user = seed_user(&h.db, 1001, "Alice").await;
    let product_id = seed_product(&h.db, "Товар", 10.0, None).await;

    CartLine::add(&h.db.pool, user.id, product_id, 1).await.unwrap();
    CartLine::add(&h.db.pool, user.id, product_id, 2).await.unwrap();

    let lines = CartLine::for_user(&h.db.pool, user.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 3);
    assert_eq!(CartLine::total(&lines), 30.0);
}

#[tokio::test]
async fn test_order_place_is_transactional() {
    let h = setup().await;
    let user = seed_user(&h.db, 1001, "Alice").await;
    let shoes = seed_product(&h.db, "Кроссовки", 100.0, None).await;
    let shirt = seed_product(&h.db, "Футболка", 25.0, None).await;
    add_to_cart(&h.db, user.id, shoes, 1).await;
    add_to_cart(&h.db, user.id, shirt, 2).await;

    let lines = CartLine::for_user(&h.db.pool, user.id).await.unwrap();
    let placed = Order::place(
        &h.db.pool,
        user.id,
        "г. Ташкент, ул. Навои, д. 15",
        None,
        None,
        "cash",
        &lines,
    )
    .await
    .unwrap();

    assert_eq!(placed.total_amount, 150.0);
    assert_eq!(placed.loyalty_points_earned, 7);

    let items = OrderItem::for_order(&h.db.pool, placed.order_id).await.unwrap();
    assert_eq!(items.len(), 2);

    // Cart cleared, sales counters bumped, loyalty credited
    assert!(CartLine::for_user(&h.db.pool, user.id).await.unwrap().is_empty());

    let product = Product::find_by_id(&h.db.pool, shirt).await.unwrap().unwrap();
    assert_eq!(product.sales_count, 2);

    let (points,): (i64,) = sqlx::query_as("SELECT points FROM loyalty_points WHERE user_id = ?")
        .bind(user.id)
        .fetch_one(&h.db.pool)
        .await
        .unwrap();
    assert_eq!(points, 7);
}

#[tokio::test]
async fn test_order_ownership_checks() {
    let h = setup().await;
    let alice = seed_user(&h.db, 1001, "Alice").await;
    let bob = seed_user(&h.db, 1002, "Bob").await;
    let product_id = seed_product(&h.db, "Товар", 10.0, None).await;
    add_to_cart(&h.db, alice.id, product_id, 1).await;

    let lines = CartLine::for_user(&h.db.pool, alice.id).await.unwrap();
    let placed = Order::place(&h.db.pool, alice.id, "длинный адрес доставки", None, None, "cash", &lines)
        .await
        .unwrap();

    assert!(Order::find_for_user(&h.db.pool, placed.order_id, alice.id)
        .await
        .unwrap()
        .is_some());
    assert!(Order::find_for_user(&h.db.pool, placed.order_id, bob.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_product_search_matches_name_and_description() {
    let h = setup().await;
    seed_product(&h.db, "Кроссовки Nike", 50.0, None).await;
    seed_product(&h.db, "Футболка", 20.0, None).await;

    let by_name = Product::search(&h.db.pool, "nike", 10).await.unwrap();
    assert_eq!(by_name.len(), 1);

    // seed_product writes "Описание <name>" into the description
    let by_description = Product::search(&h.db.pool, "Описание", 10).await.unwrap();
    assert_eq!(by_description.len(), 2);

    let nothing = Product::search(&h.db.pool, "дрель", 10).await.unwrap();
    assert!(nothing.is_empty());
}

#[tokio::test]
async fn test_review_upsert_and_purchase_gate() {
    let h = setup().await;
    let user = seed_user(&h.db, 1001, "Alice").await;
    let product_id = seed_product(&h.db, "Товар", 10.0, None).await;

    // No purchase yet
    assert!(!Review::user_purchased(&h.db.pool, user.id, product_id)
        .await
        .unwrap());

    add_to_cart(&h.db, user.id, product_id, 1).await;
    let lines = CartLine::for_user(&h.db.pool, user.id).await.unwrap();
    Order::place(&h.db.pool, user.id, "длинный адрес доставки", None, None, "cash", &lines)
        .await
        .unwrap();

    assert!(Review::user_purchased(&h.db.pool, user.id, product_id)
        .await
        .unwrap());

    // Second rating replaces the first instead of adding a row
    Review::upsert_rating(&h.db.pool, user.id, product_id, 3).await.unwrap();
    Review::upsert_rating(&h.db.pool, user.id, product_id, 5).await.unwrap();
    Review::set_comment(&h.db.pool, user.id, product_id, "Отличный товар").await.unwrap();

    let reviews = Review::recent_for_product(&h.db.pool, product_id, 10)
        .await
        .unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].rating, 5);
    assert_eq!(reviews[0].comment, "Отличный товар");
    assert_eq!(reviews[0].author, "Alice");

    let summary = Review::summary(&h.db.pool, product_id).await.unwrap();
    assert_eq!(summary.count, 1);
    assert_eq!(summary.average, 5.0);
}

#[tokio::test]
async fn test_language_update() {
    let h = setup().await;
    let user = seed_user(&h.db, 1001, "Alice").await;
    assert_eq!(user.language, "ru");

    User::update_language(&h.db.pool, user.id, "uz").await.unwrap();
    let user = User::find_by_telegram_id(&h.db.pool, 1001)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.language, "uz");
}
