//! Cart rendering, per-item callbacks and the clear-cart confirmation flow.

use anyhow::Result;

use crate::bot::commands::labels;
use crate::bot::dispatcher::Ctx;
use crate::bot::keyboards;
use crate::bot::state::Step;
use crate::bot::update::{IncomingCallback, IncomingMessage};
use crate::database::models::{CartLine, Product, User};
use crate::localization::t;
use crate::utils::format::{escape_html, format_price};
use teloxide::types::ReplyMarkup;

pub async fn show(ctx: &Ctx, chat_id: i64, user: &User) -> Result<()> {
    let lines = CartLine::for_user(&ctx.db.pool, user.id).await?;

    if lines.is_empty() {
        ctx.messenger
            .send_message(
                chat_id,
                t(&user.language, "empty_cart"),
                Some(keyboards::main_menu(&user.language)),
            )
            .await?;
        return Ok(());
    }

    let mut text = "🛒 <b>Ваша корзина</b>\n\n".to_string();
    for line in &lines {
        text.push_str(&format!(
            "🛍 {} × {} = {}\n",
            escape_html(&line.name),
            line.quantity,
            format_price(line.price * line.quantity as f64)
        ));
    }
    text.push_str(&format!(
        "\n💰 <b>Итого: {}</b>",
        format_price(CartLine::total(&lines))
    ));

    ctx.messenger
        .send_message(
            chat_id,
            &text,
            Some(ReplyMarkup::InlineKeyboard(keyboards::cart_lines_inline(
                &lines,
            ))),
        )
        .await?;
    ctx.messenger
        .send_message(
            chat_id,
            "👇 Управляйте количеством кнопками выше или оформите заказ:",
            Some(keyboards::cart_keyboard(&user.language)),
        )
        .await?;
    Ok(())
}

/// Add-to-cart callback from a product card.
pub async fn handle_add(
    ctx: &Ctx,
    cb: &IncomingCallback,
    user: &User,
    product_id: i64,
    quantity: i64,
) -> Result<()> {
    let Some(product) = Product::find_by_id(&ctx.db.pool, product_id).await? else {
        ctx.messenger
            .answer_callback(&cb.callback_id, "❌ Товар не найден")
            .await?;
        return Ok(());
    };

    let quantity = quantity.max(1);
    CartLine::add(&ctx.db.pool, user.id, product.id, quantity).await?;

    ctx.messenger
        .answer_callback(
            &cb.callback_id,
            &format!("✅ {} × {} в корзине", product.name, quantity),
        )
        .await?;
    Ok(())
}

/// Cart line quantity/removal callbacks.
pub async fn handle_item_action(
    ctx: &Ctx,
    cb: &IncomingCallback,
    user: &User,
    item_id: i64,
    delta: i64,
) -> Result<()> {
    let Some(current) = CartLine::quantity_of(&ctx.db.pool, item_id).await? else {
        ctx.messenger
            .answer_callback(&cb.callback_id, "❌ Товар уже удален из корзины")
            .await?;
        return Ok(());
    };

    if delta == 0 {
        CartLine::remove(&ctx.db.pool, item_id).await?;
        ctx.messenger
            .answer_callback(&cb.callback_id, "🗑 Товар удален из корзины")
            .await?;
    } else {
        let next = current + delta;
        if next < 1 {
            ctx.messenger
                .answer_callback(&cb.callback_id, "❌ Минимальное количество: 1")
                .await?;
            return Ok(());
        }
        CartLine::set_quantity(&ctx.db.pool, item_id, next).await?;
        ctx.messenger
            .answer_callback(&cb.callback_id, &format!("✅ Количество: {next}"))
            .await?;
    }

    // Refresh the stepper keyboard under the cart message.
    if let Some(message_id) = cb.message_id {
        let lines = CartLine::for_user(&ctx.db.pool, user.id).await?;
        ctx.messenger
            .edit_reply_markup(cb.chat_id, message_id, keyboards::cart_lines_inline(&lines))
            .await?;
    }
    Ok(())
}

/// Clear-cart button: asks for confirmation first.
pub async fn start_clear(ctx: &Ctx, msg: &IncomingMessage, user: &User) -> Result<()> {
    ctx.state.begin(
        msg.user_id,
        Step::ConfirmClearCart {
            cart_owner_id: user.id,
        },
    );
    ctx.messenger
        .send_message(
            msg.chat_id,
            t(&user.language, "confirm_clear_cart"),
            Some(keyboards::confirmation_keyboard()),
        )
        .await?;
    Ok(())
}

pub async fn handle_clear_confirm(
    ctx: &Ctx,
    msg: &IncomingMessage,
    user: &User,
    cart_owner_id: i64,
) -> Result<()> {
    let text = msg.text.as_deref().unwrap_or("");

    match text {
        labels::CONFIRM_YES => {
            CartLine::clear(&ctx.db.pool, cart_owner_id).await?;
            ctx.state.clear(msg.user_id);
            ctx.messenger
                .send_message(
                    msg.chat_id,
                    t(&user.language, "cart_cleared"),
                    Some(keyboards::main_menu(&user.language)),
                )
                .await?;
        }
        labels::CONFIRM_NO => {
            ctx.state.clear(msg.user_id);
            ctx.messenger
                .send_message(
                    msg.chat_id,
                    t(&user.language, "cancelled"),
                    Some(keyboards::main_menu(&user.language)),
                )
                .await?;
        }
        _ if labels::is_cancel(text) => {
            ctx.state.clear(msg.user_id);
            ctx.messenger
                .send_message(
                    msg.chat_id,
                    t(&user.language, "cancelled"),
                    Some(keyboards::main_menu(&user.language)),
                )
                .await?;
        }
        _ => {
            ctx.messenger
                .send_message(msg.chat_id, t(&user.language, "confirm_options"), None)
                .await?;
        }
    }
    Ok(())
}
