use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::cart::CartLine;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub total_amount: f64,
    pub status: String,
    pub delivery_address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub payment_method: String,
    pub created_at: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
    pub price: f64,
}

/// Result of a successful checkout.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: i64,
    pub total_amount: f64,
    pub loyalty_points_earned: i64,
}

const ORDER_COLUMNS: &str = "id, user_id, total_amount, status, delivery_address, \
     latitude, longitude, payment_method, created_at";

/// Loyalty credit: 5% of the order total.
const LOYALTY_RATE: f64 = 0.05;

impl Order {
    /// Places an order from the given cart lines. Inserting the order and its
    /// items, clearing the cart, bumping sales counters and crediting loyalty
    /// points happen in a single transaction: a crash leaves either no order
    /// or a complete one.
    pub async fn place(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        delivery_address: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
        payment_method: &str,
        lines: &[CartLine],
    ) -> Result<PlacedOrder, sqlx::Error> {
        let total_amount = CartLine::total(lines);
        let points = (total_amount * LOYALTY_RATE) as i64;

        let mut tx = pool.begin().await?;

        let order_id = sqlx::query(
            "INSERT INTO orders (user_id, total_amount, delivery_address, latitude, longitude, payment_method) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(total_amount)
        .bind(delivery_address)
        .bind(latitude)
        .bind(longitude)
        .bind(payment_method)
        .execute(&mut tx)
        .await?
        .last_insert_rowid();

        for line in lines {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, quantity, price) VALUES (?, ?, ?, ?)",
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.price)
            .execute(&mut tx)
            .await?;

            sqlx::query("UPDATE products SET sales_count = sales_count + ? WHERE id = ?")
                .bind(line.quantity)
                .bind(line.product_id)
                .execute(&mut tx)
                .await?;
        }

        sqlx::query("DELETE FROM cart WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut tx)
            .await?;

        sqlx::query(
            "UPDATE loyalty_points SET points = points + ?, total_earned = total_earned + ? \
             WHERE user_id = ?",
        )
        .bind(points)
        .bind(points)
        .bind(user_id)
        .execute(&mut tx)
        .await?;

        tx.commit().await?;

        Ok(PlacedOrder {
            order_id,
            total_amount,
            loyalty_points_earned: points,
        })
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        order_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?"
        ))
        .bind(order_id)
        .fetch_optional(pool)
        .await
    }

    /// Looks an order up only if it belongs to `user_id`.
    pub async fn find_for_user(
        pool: &sqlx::SqlitePool,
        order_id: i64,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ? AND user_id = ?"
        ))
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn by_user(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ? ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn recent(pool: &sqlx::SqlitePool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn set_status(
        pool: &sqlx::SqlitePool,
        order_id: i64,
        status: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(status)
            .bind(order_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn count(pool: &sqlx::SqlitePool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    pub async fn revenue(pool: &sqlx::SqlitePool) -> Result<f64, sqlx::Error> {
        let row: (Option<f64>,) = sqlx::query_as(
            "SELECT SUM(total_amount) FROM orders WHERE status != 'cancelled'",
        )
        .fetch_one(pool)
        .await?;
        Ok(row.0.unwrap_or(0.0))
    }
}

impl OrderItem {
    pub async fn for_order(
        pool: &sqlx::SqlitePool,
        order_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, OrderItem>(
            "SELECT oi.id, oi.order_id, oi.product_id, p.name, oi.quantity, oi.price \
             FROM order_items oi JOIN products p ON p.id = oi.product_id \
             WHERE oi.order_id = ?",
        )
        .bind(order_id)
        .fetch_all(pool)
        .await
    }
}
