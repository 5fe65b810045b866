//! Catalog browsing: categories → subcategories → product cards.
//!
//! Button labels are resolved against the in-memory catalog cache; product
//! details are read from the database so prices and stock are always
//! current.

use anyhow::Result;

use crate::bot::dispatcher::Ctx;
use crate::bot::keyboards;
use crate::bot::update::IncomingCallback;
use crate::database::models::{Category, Product, Review, Subcategory, User};
use crate::utils::format::{escape_html, format_price, stars_display, truncate_text};
use teloxide::types::ReplyMarkup;

pub async fn show_catalog(ctx: &Ctx, chat_id: i64) -> Result<()> {
    let categories = ctx.cache.categories();

    if categories.is_empty() {
        ctx.messenger
            .send_message(chat_id, "❌ Каталог пока пуст", None)
            .await?;
        return Ok(());
    }

    ctx.messenger
        .send_message(
            chat_id,
            "🛍 <b>Каталог</b>\n\nВыберите категорию:",
            Some(keyboards::categories_keyboard(&categories)),
        )
        .await?;
    Ok(())
}

pub async fn show_category(ctx: &Ctx, chat_id: i64, category: &Category) -> Result<()> {
    let subcategories = ctx.cache.subcategories_of(category.id);

    if !subcategories.is_empty() {
        ctx.messenger
            .send_message(
                chat_id,
                &format!(
                    "📂 <b>{}</b>\n\nВыберите бренд или подкатегорию:",
                    escape_html(&category.name)
                ),
                Some(keyboards::subcategories_keyboard(&subcategories)),
            )
            .await?;
        return Ok(());
    }

    let products = Product::by_category(&ctx.db.pool, category.id).await?;
    show_product_list(ctx, chat_id, &category.name, &products).await
}

pub async fn show_subcategory(ctx: &Ctx, chat_id: i64, subcategory: &Subcategory) -> Result<()> {
    let products = Product::by_subcategory(&ctx.db.pool, subcategory.id).await?;
    show_product_list(ctx, chat_id, &subcategory.name, &products).await
}

async fn show_product_list(
    ctx: &Ctx,
    chat_id: i64,
    title: &str,
    products: &[Product],
) -> Result<()> {
    if products.is_empty() {
        ctx.messenger
            .send_message(
                chat_id,
                &format!("❌ В разделе '{}' пока нет товаров", escape_html(title)),
                Some(keyboards::back_keyboard()),
            )
            .await?;
        return Ok(());
    }

    ctx.messenger
        .send_message(
            chat_id,
            &format!("🛍 <b>{}</b>\n\nВыберите товар:", escape_html(title)),
            Some(keyboards::products_keyboard(products)),
        )
        .await?;
    Ok(())
}

/// Full product card with photo, rating summary and inline actions.
pub async fn show_product(ctx: &Ctx, chat_id: i64, product: &Product) -> Result<()> {
    Product::increment_views(&ctx.db.pool, product.id).await?;
    let summary = Review::summary(&ctx.db.pool, product.id).await?;

    let mut text = format!("🛍 <b>{}</b>\n\n", escape_html(&product.name));
    if let Some(description) = &product.description {
        text.push_str(&format!("{}\n\n", escape_html(description)));
    }
    text.push_str(&format!("💰 Цена: <b>{}</b>\n", format_price(product.price)));
    text.push_str(&format!("📦 В наличии: {} шт.\n", product.stock));
    if summary.count > 0 {
        text.push_str(&format!(
            "⭐ Рейтинг: {:.1}/5 ({} отзывов)\n",
            summary.average, summary.count
        ));
    }

    let keyboard = ReplyMarkup::InlineKeyboard(keyboards::product_inline(product.id, 1));

    match &product.image_url {
        Some(image_url) => {
            ctx.messenger
                .send_photo(chat_id, image_url, &text, Some(keyboard))
                .await?;
        }
        None => {
            ctx.messenger
                .send_message(chat_id, &text, Some(keyboard))
                .await?;
        }
    }
    Ok(())
}

/// Quantity stepper on a product card: only the keyboard is edited.
pub async fn handle_qty_step(
    ctx: &Ctx,
    cb: &IncomingCallback,
    product_id: i64,
    quantity: i64,
) -> Result<()> {
    let quantity = quantity.max(1);

    if let Some(message_id) = cb.message_id {
        ctx.messenger
            .edit_reply_markup(
                cb.chat_id,
                message_id,
                keyboards::product_inline(product_id, quantity),
            )
            .await?;
    }
    ctx.messenger
        .answer_callback(&cb.callback_id, &format!("{quantity} шт."))
        .await?;
    Ok(())
}

pub async fn show_reviews(
    ctx: &Ctx,
    cb: &IncomingCallback,
    _user: &User,
    product_id: i64,
) -> Result<()> {
    let reviews = Review::recent_for_product(&ctx.db.pool, product_id, 5).await?;

    if reviews.is_empty() {
        ctx.messenger
            .answer_callback(&cb.callback_id, "💬 Отзывов пока нет")
            .await?;
        return Ok(());
    }

    ctx.messenger
        .answer_callback(&cb.callback_id, "💬 Отзывы")
        .await?;

    let mut text = "💬 <b>Отзывы покупателей:</b>\n\n".to_string();
    for review in &reviews {
        text.push_str(&format!(
            "{} <b>{}</b>\n",
            stars_display(review.rating),
            escape_html(&review.author)
        ));
        if !review.comment.is_empty() {
            text.push_str(&format!(
                "💭 <i>\"{}\"</i>\n",
                escape_html(&truncate_text(&review.comment, 100))
            ));
        }
        text.push('\n');
    }

    ctx.messenger.send_message(cb.chat_id, &text, None).await?;
    Ok(())
}
