//! Customer order views: the list and the `/order_<id>` detail.

use anyhow::Result;

use crate::bot::dispatcher::Ctx;
use crate::bot::keyboards;
use crate::database::models::{Order, OrderItem, User};
use crate::utils::format::{
    escape_html, format_date, format_price, order_status_emoji, order_status_text,
};

pub async fn show_list(ctx: &Ctx, chat_id: i64, user: &User) -> Result<()> {
    let orders = Order::by_user(&ctx.db.pool, user.id).await?;

    if orders.is_empty() {
        ctx.messenger
            .send_message(
                chat_id,
                "📋 У вас пока нет заказов\n\n💡 Перейдите в каталог, чтобы сделать первый заказ",
                Some(keyboards::main_menu(&user.language)),
            )
            .await?;
        return Ok(());
    }

    let mut text = "📋 <b>Ваши заказы:</b>\n\n".to_string();
    for order in &orders {
        text.push_str(&format!(
            "{} <b>Заказ #{}</b> — {}\n",
            order_status_emoji(&order.status),
            order.id,
            format_price(order.total_amount)
        ));
        text.push_str(&format!(
            "📅 {} • {}\n",
            format_date(&order.created_at),
            order_status_text(&order.status)
        ));
        text.push_str(&format!("👉 /order_{}\n\n", order.id));
    }

    ctx.messenger
        .send_message(chat_id, &text, Some(keyboards::main_menu(&user.language)))
        .await?;
    Ok(())
}

/// `/order_<id>`: detail view, only for the order's owner.
pub async fn show_detail(ctx: &Ctx, chat_id: i64, user: &User, order_id: i64) -> Result<()> {
    let Some(order) = Order::find_for_user(&ctx.db.pool, order_id, user.id).await? else {
        ctx.messenger
            .send_message(chat_id, &format!("❌ Заказ #{order_id} не найден"), None)
            .await?;
        return Ok(());
    };

    let items = OrderItem::for_order(&ctx.db.pool, order.id).await?;

    let mut text = format!("📋 <b>Заказ #{}</b>\n\n", order.id);
    text.push_str(&format!(
        "📊 Статус: {} {}\n",
        order_status_emoji(&order.status),
        order_status_text(&order.status)
    ));
    text.push_str(&format!("💰 Сумма: {}\n", format_price(order.total_amount)));
    text.push_str(&format!("📅 Дата: {}\n", format_date(&order.created_at)));
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

    ctx.messenger.send_message(chat_id, &text, None).await?;
    Ok(())
}
