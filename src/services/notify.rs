use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use tracing::{error, info};

use crate::bot::messenger::Messenger;
use crate::database::connection::DatabaseManager;
use crate::database::models::{Order, OrderItem, User};
use crate::utils::format::{escape_html, format_price, order_status_emoji, order_status_text};

/// Fans notifications out to every admin (and back to customers on status
/// changes). Sends are best-effort: one unreachable admin does not stop the
/// rest.
#[derive(Clone)]
pub struct AdminNotifier {
    messenger: Arc<dyn Messenger>,
    db: DatabaseManager,
}

impl AdminNotifier {
    pub fn new(messenger: Arc<dyn Messenger>, db: DatabaseManager) -> Self {
        Self { messenger, db }
    }

    async fn broadcast_to_admins(&self, text: &str) -> Result<()> {
        let admins = User::admin_telegram_ids(&self.db.pool).await?;
        for admin_id in admins {
            if let Err(e) = self.messenger.send_message(admin_id, text, None).await {
                error!("Failed to notify admin {}: {}", admin_id, e);
            }
        }
        Ok(())
    }

    /// New order placed: summary with items to every admin.
    pub async fn order_created(&self, order_id: i64) -> Result<()> {
        let Some(order) = Order::find_by_id(&self.db.pool, order_id).await? else {
            return Ok(());
        };
        let items = OrderItem::for_order(&self.db.pool, order_id).await?;

        let mut text = format!("🔔 <b>Новый заказ #{}</b>\n\n", order.id);
        text.push_str(&format!("💰 Сумма: {}\n", format_price(order.total_amount)));
        text.push_str(&format!(
            "📍 Адрес: {}\n",
            escape_html(&order.delivery_address)
        ));
        text.push_str(&format!("💳 Оплата: {}\n\n", order.payment_method));
        text.push_str("🛍 <b>Товары:</b>\n");
        for item in &items {
            text.push_str(&format!(
                "• {} × {} = {}\n",
                escape_html(&item.name),
                item.quantity,
                format_price(item.price * item.quantity as f64)
            ));
        }

        self.broadcast_to_admins(&text).await
    }

    /// Seller application summary to every admin.
    pub async fn seller_application(
        &self,
        name: &str,
        phone: &str,
        brand: &str,
        products: &str,
    ) -> Result<()> {
        let text = format!(
            "🧑‍💼 <b>Новая заявка продавца</b>\n\n• Имя: {}\n• Телефон: {}\n• Бренд/Компания: {}\n• Что продаёт: {}",
            escape_html(name),
            escape_html(phone),
            escape_html(brand),
            escape_html(products)
        );
        self.broadcast_to_admins(&text).await
    }

    /// Customer-facing status change notification.
    pub async fn order_status_changed(&self, order: &Order, status: &str) -> Result<()> {
        let customer: Option<(i64,)> =
            sqlx::query_as("SELECT telegram_id FROM users WHERE id = ?")
                .bind(order.user_id)
                .fetch_optional(&self.db.pool)
                .await?;

        let Some((telegram_id,)) = customer else {
            return Ok(());
        };

        let text = format!(
            "📋 <b>Заказ #{}</b>\n\nСтатус изменен: {} {}",
            order.id,
            order_status_emoji(status),
            order_status_text(status)
        );
        self.messenger.send_message(telegram_id, &text, None).await
    }

    /// Summary sent to admins after a reload signal was applied.
    pub async fn reload_summary(&self, categories: usize, products: usize, posts: usize) {
        let text = format!(
            "🔄 <b>Данные обновлены!</b>\n\n✅ Категорий: {}\n✅ Товаров: {}\n✅ Автопостов: {}\n\n⏰ {}",
            categories,
            products,
            posts,
            Local::now().format("%H:%M:%S")
        );
        if let Err(e) = self.broadcast_to_admins(&text).await {
            error!("Failed to send reload summary: {}", e);
        } else {
            info!("Reload summary sent to admins");
        }
    }
}
