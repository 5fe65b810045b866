use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub emoji: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub emoji: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub image_url: Option<String>,
    pub stock: i64,
    pub views: i64,
    pub sales_count: i64,
    pub is_active: bool,
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, category_id, subcategory_id, \
     image_url, stock, views, sales_count, is_active";

impl Category {
    /// Reply-keyboard label, matched verbatim by the dispatcher.
    pub fn label(&self) -> String {
        format!("{} {}", self.emoji, self.name)
    }

    pub async fn all_active(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, emoji, is_active FROM categories WHERE is_active = 1 ORDER BY name",
        )
        .fetch_all(pool)
        .await
    }
}

impl Subcategory {
    pub fn label(&self) -> String {
        format!("{} {}", self.emoji, self.name)
    }

    pub async fn all_active(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subcategory>(
            "SELECT id, category_id, name, emoji, is_active FROM subcategories \
             WHERE is_active = 1 ORDER BY name",
        )
        .fetch_all(pool)
        .await
    }
}

impl Product {
    /// Reply-keyboard label, matched verbatim by the dispatcher.
    pub fn label(&self) -> String {
        format!("🛍 {}", self.name)
    }

    pub async fn all_active(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY name"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        product_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"
        ))
        .bind(product_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn by_category(
        pool: &sqlx::SqlitePool,
        category_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 AND category_id = ? ORDER BY name"
        ))
        .bind(category_id)
        .fetch_all(pool)
        .await
    }

    pub async fn by_subcategory(
        pool: &sqlx::SqlitePool,
        subcategory_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 AND subcategory_id = ? ORDER BY name"
        ))
        .bind(subcategory_id)
        .fetch_all(pool)
        .await
    }

    /// Case-insensitive substring search over name and description.
    pub async fn search(
        pool: &sqlx::SqlitePool,
        query: &str,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = format!("%{}%", query.trim());
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 AND (name LIKE ? OR description LIKE ?) \
             ORDER BY views DESC, name LIMIT ?"
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn increment_views(
        pool: &sqlx::SqlitePool,
        product_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE products SET views = views + 1 WHERE id = ?")
            .bind(product_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
