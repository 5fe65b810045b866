use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ScheduledPost {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub time_morning: Option<String>,
    pub time_afternoon: Option<String>,
    pub time_evening: Option<String>,
    pub target_audience: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PostStatistic {
    pub id: i64,
    pub post_id: i64,
    pub time_period: String,
    pub sent_count: i64,
    pub error_count: i64,
    pub sent_at: String,
}

const POST_COLUMNS: &str = "id, title, content, image_url, time_morning, time_afternoon, \
     time_evening, target_audience, is_active";

impl ScheduledPost {
    pub async fn all_active(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ScheduledPost>(&format!(
            "SELECT {POST_COLUMNS} FROM scheduled_posts WHERE is_active = 1"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        post_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, ScheduledPost>(&format!(
            "SELECT {POST_COLUMNS} FROM scheduled_posts WHERE id = ?"
        ))
        .bind(post_id)
        .fetch_optional(pool)
        .await
    }

    /// Resolves an audience selector to recipient Telegram chat ids at send
    /// time. The `channel` audience is handled by the scheduler itself.
    pub async fn audience_telegram_ids(
        pool: &sqlx::SqlitePool,
        audience: &str,
    ) -> Result<Vec<i64>, sqlx::Error> {
        let sql = match audience {
            "all" => "SELECT telegram_id FROM users WHERE is_admin = 0",
            "active" => {
                "SELECT DISTINCT u.telegram_id FROM users u \
                 JOIN orders o ON o.user_id = u.id \
                 WHERE u.is_admin = 0 AND o.created_at >= datetime('now', '-30 days')"
            }
            "vip" => {
                "SELECT u.telegram_id FROM users u \
                 JOIN orders o ON o.user_id = u.id \
                 WHERE u.is_admin = 0 \
                 GROUP BY u.id HAVING SUM(o.total_amount) >= 500"
            }
            "new" => {
                "SELECT telegram_id FROM users \
                 WHERE is_admin = 0 AND created_at >= datetime('now', '-7 days')"
            }
            _ => return Ok(Vec::new()),
        };

        let rows: Vec<(i64,)> = sqlx::query_as(sql).fetch_all(pool).await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}

impl PostStatistic {
    /// Persists per-run fan-out counters for reporting.
    pub async fn record(
        pool: &sqlx::SqlitePool,
        post_id: i64,
        time_period: &str,
        sent_count: i64,
        error_count: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO post_statistics (post_id, time_period, sent_count, error_count) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(post_id)
        .bind(time_period)
        .bind(sent_count)
        .bind(error_count)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn for_post(
        pool: &sqlx::SqlitePool,
        post_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PostStatistic>(
            "SELECT id, post_id, time_period, sent_count, error_count, sent_at \
             FROM post_statistics WHERE post_id = ? ORDER BY sent_at DESC",
        )
        .bind(post_id)
        .fetch_all(pool)
        .await
    }
}
