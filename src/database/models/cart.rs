use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A cart row joined with its product, as rendered to the user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CartLine {
    pub id: i64,
    pub product_id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

impl CartLine {
    /// Adds a product to the cart, bumping quantity if it is already there.
    pub async fn add(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> Result<(), sqlx::Error> {
        let existing: Option<(i64, i64)> = sqlx::query_as(
            "SELECT id, quantity FROM cart WHERE user_id = ? AND product_id = ?",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(pool)
        .await?;

        match existing {
            Some((id, current)) => {
                sqlx::query("UPDATE cart SET quantity = ? WHERE id = ?")
                    .bind(current + quantity)
                    .bind(id)
                    .execute(pool)
                    .await?;
            }
            None => {
                sqlx::query("INSERT INTO cart (user_id, product_id, quantity) VALUES (?, ?, ?)")
                    .bind(user_id)
                    .bind(product_id)
                    .bind(quantity)
                    .execute(pool)
                    .await?;
            }
        }

        Ok(())
    }

    pub async fn for_user(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CartLine>(
            "SELECT c.id, c.product_id, p.name, p.price, c.quantity \
             FROM cart c JOIN products p ON p.id = c.product_id \
             WHERE c.user_id = ? ORDER BY c.created_at",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn quantity_of(
        pool: &sqlx::SqlitePool,
        cart_item_id: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT quantity FROM cart WHERE id = ?")
            .bind(cart_item_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(|(q,)| q))
    }

    pub async fn set_quantity(
        pool: &sqlx::SqlitePool,
        cart_item_id: i64,
        quantity: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE cart SET quantity = ? WHERE id = ?")
            .bind(quantity)
            .bind(cart_item_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn remove(
        pool: &sqlx::SqlitePool,
        cart_item_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM cart WHERE id = ?")
            .bind(cart_item_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn clear(pool: &sqlx::SqlitePool, user_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM cart WHERE user_id = ?")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub fn total(lines: &[CartLine]) -> f64 {
        lines.iter().map(|l| l.price * l.quantity as f64).sum()
    }
}
