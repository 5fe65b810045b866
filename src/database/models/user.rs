use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub telegram_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub language: String,
    pub is_admin: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LoyaltyBalance {
    pub user_id: i64,
    pub points: i64,
    pub total_earned: i64,
}

const USER_COLUMNS: &str =
    "id, telegram_id, name, phone, email, language, is_admin, created_at";

impl User {
    /// Registers a user together with their loyalty-points row in one
    /// transaction.
    pub async fn create(
        pool: &sqlx::SqlitePool,
        telegram_id: i64,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
        language: &str,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "INSERT INTO users (telegram_id, name, phone, email, language) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(telegram_id)
        .bind(name)
        .bind(phone)
        .bind(email)
        .bind(language)
        .execute(&mut tx)
        .await?;

        sqlx::query(
            "INSERT OR IGNORE INTO loyalty_points (user_id) \
             SELECT id FROM users WHERE telegram_id = ?",
        )
        .bind(telegram_id)
        .execute(&mut tx)
        .await?;

        tx.commit().await?;

        Self::find_by_telegram_id(pool, telegram_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_telegram_id(
        pool: &sqlx::SqlitePool,
        telegram_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE telegram_id = ?"
        ))
        .bind(telegram_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn update_language(
        pool: &sqlx::SqlitePool,
        user_id: i64,
        language: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET language = ? WHERE id = ?")
            .bind(language)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Telegram ids of every admin, for notification fan-out.
    pub async fn admin_telegram_ids(pool: &sqlx::SqlitePool) -> Result<Vec<i64>, sqlx::Error> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT telegram_id FROM users WHERE is_admin = 1")
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Seeds (or promotes) the admin configured via the environment.
    pub async fn ensure_admin(
        pool: &sqlx::SqlitePool,
        telegram_id: i64,
        name: &str,
    ) -> Result<(), sqlx::Error> {
        let existing = Self::find_by_telegram_id(pool, telegram_id).await?;

        match existing {
            Some(user) if user.is_admin => {}
            Some(user) => {
                sqlx::query("UPDATE users SET is_admin = 1 WHERE id = ?")
                    .bind(user.id)
                    .execute(pool)
                    .await?;
            }
            None => {
                sqlx::query(
                    "INSERT INTO users (telegram_id, name, is_admin) VALUES (?, ?, 1)",
                )
                .bind(telegram_id)
                .bind(name)
                .execute(pool)
                .await?;
            }
        }

        Ok(())
    }

    pub async fn count(pool: &sqlx::SqlitePool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}

impl LoyaltyBalance {
    pub async fn for_user(
        pool: &sqlx::SqlitePool,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, LoyaltyBalance>(
            "SELECT user_id, points, total_earned FROM loyalty_points WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Display tier derived from lifetime points.
    pub fn tier(&self) -> &'static str {
        match self.total_earned {
            t if t >= 5000 => "💍 Diamond",
            t if t >= 1500 => "💎 Platinum",
            t if t >= 500 => "🥇 Gold",
            t if t >= 100 => "🥈 Silver",
            _ => "🥉 Bronze",
        }
    }
}
