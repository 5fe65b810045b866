//! Admin back-office surface on the bot side: order list with status
//! transitions and a stats summary. Routed only for `users.is_admin`.

use anyhow::Result;

use crate::bot::callbacks::OrderStatus;
use crate::bot::commands::AdminCommand;
use crate::bot::dispatcher::Ctx;
use crate::bot::keyboards;
use crate::bot::update::{IncomingCallback, IncomingMessage};
use crate::database::models::{Order, User};
use crate::utils::format::{
    format_date, format_price, order_status_emoji, order_status_text,
};
use teloxide::types::ReplyMarkup;

pub async fn handle_command(
    ctx: &Ctx,
    msg: &IncomingMessage,
    user: &User,
    command: AdminCommand,
) -> Result<()> {
    match command {
        AdminCommand::Menu => show_menu(ctx, msg.chat_id).await,
        AdminCommand::Orders => show_orders(ctx, msg.chat_id).await,
        AdminCommand::Stats => show_stats(ctx, msg.chat_id).await,
        AdminCommand::UserMode => {
            ctx.messenger
                .send_message(
                    msg.chat_id,
                    "👤 Пользовательский режим",
                    Some(keyboards::main_menu(&user.language)),
                )
                .await?;
            Ok(())
        }
    }
}

async fn show_menu(ctx: &Ctx, chat_id: i64) -> Result<()> {
    ctx.messenger
        .send_message(
            chat_id,
            "🛠 <b>Админ-панель</b>\n\nВыберите раздел:",
            Some(keyboards::admin_menu()),
        )
        .await?;
    Ok(())
}

async fn show_orders(ctx: &Ctx, chat_id: i64) -> Result<()> {
    let orders = Order::recent(&ctx.db.pool, 10).await?;

    if orders.is_empty() {
        ctx.messenger
            .send_message(chat_id, "📦 Заказов пока нет", None)
            .await?;
        return Ok(());
    }

    ctx.messenger
        .send_message(chat_id, "📦 <b>Последние заказы:</b>", None)
        .await?;

    for order in &orders {
        let text = format!(
            "{} <b>Заказ #{}</b> — {}\n📅 {} • {}",
            order_status_emoji(&order.status),
            order.id,
            format_price(order.total_amount),
            format_date(&order.created_at),
            order_status_text(&order.status)
        );
        ctx.messenger
            .send_message(
                chat_id,
                &text,
                Some(ReplyMarkup::InlineKeyboard(keyboards::order_status_inline(
                    order.id,
                ))),
            )
            .await?;
    }
    Ok(())
}

async fn show_stats(ctx: &Ctx, chat_id: i64) -> Result<()> {
    let users = User::count(&ctx.db.pool).await?;
    let orders = Order::count(&ctx.db.pool).await?;
    let revenue = Order::revenue(&ctx.db.pool).await?;
    let metrics = ctx.metrics.snapshot();

    let mut text = "📊 <b>Статистика</b>\n\n".to_string();
    text.push_str(&format!("👥 Пользователей: {users}\n"));
    text.push_str(&format!("📦 Заказов: {orders}\n"));
    text.push_str(&format!("💰 Выручка: {}\n\n", format_price(revenue)));
    text.push_str(&format!(
        "⚙️ Обработано обновлений: {}\n",
        metrics.updates_processed
    ));
    text.push_str(&format!("❗ Ошибок обработчиков: {}\n", metrics.handler_errors));
    text.push_str(&format!("🔄 Перезагрузок данных: {}\n", metrics.reloads_applied));
    text.push_str(&format!("📢 Отправлено автопостов: {}\n", metrics.posts_fired));

    ctx.messenger.send_message(chat_id, &text, None).await?;
    Ok(())
}

/// Order status callback. The dispatcher has already verified the sender is
/// an admin.
pub async fn handle_set_status(
    ctx: &Ctx,
    cb: &IncomingCallback,
    order_id: i64,
    status: OrderStatus,
) -> Result<()> {
    let Some(order) = Order::find_by_id(&ctx.db.pool, order_id).await? else {
        ctx.messenger
            .answer_callback(&cb.callback_id, &format!("❌ Заказ #{order_id} не найден"))
            .await?;
        return Ok(());
    };

    Order::set_status(&ctx.db.pool, order_id, status.as_str()).await?;

    ctx.messenger
        .answer_callback(
            &cb.callback_id,
            &format!(
                "{} Заказ #{}: {}",
                order_status_emoji(status.as_str()),
                order_id,
                order_status_text(status.as_str())
            ),
        )
        .await?;

    // Tell the customer, best-effort.
    if let Err(e) = ctx.notifier.order_status_changed(&order, status.as_str()).await {
        tracing::error!("Failed to notify customer about order {}: {}", order_id, e);
    }
    Ok(())
}
