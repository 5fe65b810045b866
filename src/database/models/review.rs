use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub rating: i64,
    pub comment: String,
    pub created_at: String,
    pub author: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewSummary {
    pub average: f64,
    pub count: i64,
}

impl Review {
    /// Saves a rating, replacing the user's previous review of this product.
    pub async fn upsert_rating(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        product_id: i64,
        rating: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO reviews (user_id, product_id, rating) VALUES (?, ?, ?) \
             ON CONFLICT (user_id, product_id) \
             DO UPDATE SET rating = excluded.rating, created_at = datetime('now')",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(rating)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn set_comment(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        product_id: i64,
        comment: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE reviews SET comment = ? WHERE user_id = ? AND product_id = ?")
            .bind(comment)
            .bind(user_id)
            .bind(product_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn recent_for_product(
        pool: &sqlx::SqlitePool,
        product_id: i64,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            "SELECT r.id, r.user_id, r.product_id, r.rating, r.comment, r.created_at, \
                    u.name AS author \
             FROM reviews r JOIN users u ON u.id = r.user_id \
             WHERE r.product_id = ? ORDER BY r.created_at DESC LIMIT ?",
        )
        .bind(product_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn summary(
        pool: &sqlx::SqlitePool,
        product_id: i64,
    ) -> Result<ReviewSummary, sqlx::Error> {
        let row: (Option<f64>, i64) = sqlx::query_as(
            "SELECT AVG(rating), COUNT(*) FROM reviews WHERE product_id = ?",
        )
        .bind(product_id)
        .fetch_one(pool)
        .await?;

        Ok(ReviewSummary {
            average: row.0.unwrap_or(0.0),
            count: row.1,
        })
    }

    /// Only verified purchasers may rate a product.
    pub async fn user_purchased(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        product_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM order_items oi \
             JOIN orders o ON o.id = oi.order_id \
             WHERE o.user_id = ? AND oi.product_id = ? AND o.status != 'cancelled'",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0 > 0)
    }
}
