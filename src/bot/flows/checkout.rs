//! Checkout: address (text or shared location) → payment method.
//!
//! The payment step itself is stateless: after a valid address the step
//! returns to `Idle` and an inline payment selector drives the rest through
//! callback data. The delivery address survives in scratch until the
//! payment callback commits the order.

use anyhow::Result;

use crate::bot::callbacks::PaymentMethod;
use crate::bot::commands::labels;
use crate::bot::dispatcher::Ctx;
use crate::bot::keyboards;
use crate::bot::state::Step;
use crate::bot::update::{IncomingCallback, IncomingMessage};
use crate::database::models::{CartLine, Order, User};
use crate::localization::t;
use crate::utils::format::{escape_html, format_price};
use crate::utils::validation::validate_address;
use teloxide::types::ReplyMarkup;

/// Entry point for the checkout button. An empty cart is rejected without
/// any state change.
pub async fn start(ctx: &Ctx, msg: &IncomingMessage, user: &User) -> Result<()> {
    let lines = CartLine::for_user(&ctx.db.pool, user.id).await?;

    if lines.is_empty() {
        ctx.messenger
            .send_message(msg.chat_id, t(&user.language, "empty_cart"), None)
            .await?;
        return Ok(());
    }

    let total = CartLine::total(&lines);
    let mut text = "📦 <b>Оформление заказа</b>\n\n".to_string();
    text.push_str(&format!("🛍 Товаров: {}\n", lines.len()));
    text.push_str(&format!("💰 Сумма: {}\n\n", format_price(total)));
    text.push_str(t(&user.language, "ask_address"));

    ctx.state.begin(msg.user_id, Step::OrderAddress);
    ctx.messenger
        .send_message(msg.chat_id, &text, Some(keyboards::address_keyboard()))
        .await?;
    Ok(())
}

pub async fn handle_address(ctx: &Ctx, msg: &IncomingMessage, user: &User) -> Result<()> {
    let text = msg.text.as_deref().unwrap_or("");

    // Shared location completes the step with a placeholder address.
    if let Some((lat, lon)) = msg.location {
        ctx.state.set(
            msg.user_id,
            Step::Idle,
            &[
                ("address", "Геолокация отправлена".to_string()),
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
            ],
        );
        return present_payment_selector(ctx, msg.chat_id, user).await;
    }

    if text == labels::ENTER_ADDRESS {
        ctx.messenger
            .send_message(msg.chat_id, "✍️ Введите адрес доставки текстом:", None)
            .await?;
        return Ok(());
    }

    if labels::is_cancel(text) {
        ctx.state.clear(msg.user_id);
        ctx.messenger
            .send_message(
                msg.chat_id,
                t(&user.language, "main_menu"),
                Some(keyboards::main_menu(&user.language)),
            )
            .await?;
        return Ok(());
    }

    let address = match validate_address(text) {
        Ok(address) => address,
        Err(_) => {
            ctx.messenger
                .send_message(msg.chat_id, t(&user.language, "address_too_short"), None)
                .await?;
            return Ok(());
        }
    };

    ctx.state
        .set(msg.user_id, Step::Idle, &[("address", address)]);
    present_payment_selector(ctx, msg.chat_id, user).await
}

async fn present_payment_selector(ctx: &Ctx, chat_id: i64, user: &User) -> Result<()> {
    ctx.messenger
        .send_message(
            chat_id,
            t(&user.language, "pick_payment"),
            Some(ReplyMarkup::InlineKeyboard(keyboards::payment_methods(
                &user.language,
            ))),
        )
        .await?;
    Ok(())
}

/// Payment-method callback: creates the order, clears the cart and credits
/// loyalty points in one transaction, then notifies the admins.
pub async fn handle_payment(
    ctx: &Ctx,
    cb: &IncomingCallback,
    user: &User,
    method: PaymentMethod,
) -> Result<()> {
    let lines = CartLine::for_user(&ctx.db.pool, user.id).await?;

    if lines.is_empty() {
        ctx.messenger
            .answer_callback(&cb.callback_id, "❌ Корзина пуста")
            .await?;
        return Ok(());
    }

    let address = ctx
        .state
        .scratch(cb.user_id, "address")
        .unwrap_or_else(|| "Не указан".to_string());
    let latitude = ctx
        .state
        .scratch(cb.user_id, "lat")
        .and_then(|v| v.parse().ok());
    let longitude = ctx
        .state
        .scratch(cb.user_id, "lon")
        .and_then(|v| v.parse().ok());

    let placed = Order::place(
        &ctx.db.pool,
        user.id,
        &address,
        latitude,
        longitude,
        method.as_str(),
        &lines,
    )
    .await?;

    ctx.state.clear(cb.user_id);

    ctx.messenger
        .answer_callback(&cb.callback_id, "✅ Заказ оформлен")
        .await?;

    let mut text = format!("✅ <b>Заказ #{} оформлен!</b>\n\n", placed.order_id);
    text.push_str(&format!("💰 Сумма: {}\n", format_price(placed.total_amount)));
    text.push_str(&format!("📍 Адрес: {}\n", escape_html(&address)));
    text.push_str(&format!(
        "⭐ Начислено баллов: {}\n\n",
        placed.loyalty_points_earned
    ));
    text.push_str(match method {
        PaymentMethod::Online => "💳 Ссылка для оплаты будет отправлена отдельно",
        PaymentMethod::Cash => "📞 Мы свяжемся с вами для подтверждения",
    });

    ctx.messenger
        .send_message(
            cb.chat_id,
            &text,
            Some(keyboards::main_menu(&user.language)),
        )
        .await?;

    ctx.notifier.order_created(placed.order_id).await?;
    Ok(())
}
