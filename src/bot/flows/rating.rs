//! Product ratings. The star rating arrives via callback; an optional text
//! comment is collected afterwards through the `RatingProduct` step.

use anyhow::Result;

use crate::bot::commands::labels;
use crate::bot::dispatcher::Ctx;
use crate::bot::keyboards;
use crate::bot::state::Step;
use crate::bot::update::{IncomingCallback, IncomingMessage};
use crate::database::models::{Review, User};
use crate::localization::t;
use teloxide::types::ReplyMarkup;

/// "⭐ Оценить" on a product card: opens the 1..=5 keyboard.
pub async fn open_keyboard(ctx: &Ctx, cb: &IncomingCallback, product_id: i64) -> Result<()> {
    ctx.messenger
        .answer_callback(&cb.callback_id, "⭐ Выберите оценку")
        .await?;
    ctx.messenger
        .send_message(
            cb.chat_id,
            "⭐ Оцените товар:",
            Some(ReplyMarkup::InlineKeyboard(keyboards::rating_keyboard(
                product_id,
            ))),
        )
        .await?;
    Ok(())
}

/// Star pressed: verified purchasers only, then ask for an optional comment.
pub async fn handle_submit(
    ctx: &Ctx,
    cb: &IncomingCallback,
    user: &User,
    product_id: i64,
    rating: i64,
) -> Result<()> {
    if !Review::user_purchased(&ctx.db.pool, user.id, product_id).await? {
        ctx.messenger
            .answer_callback(
                &cb.callback_id,
                "❌ Вы можете оценивать только купленные товары",
            )
            .await?;
        return Ok(());
    }

    Review::upsert_rating(&ctx.db.pool, user.id, product_id, rating).await?;

    ctx.messenger
        .answer_callback(
            &cb.callback_id,
            &format!("{} {}", t(&user.language, "rate_thanks"), "⭐".repeat(rating as usize)),
        )
        .await?;

    ctx.state.begin(cb.user_id, Step::RatingProduct { product_id });
    ctx.messenger
        .send_message(
            cb.chat_id,
            t(&user.language, "rate_comment_prompt"),
            Some(keyboards::skip_cancel_keyboard()),
        )
        .await?;
    Ok(())
}

/// Comment step after the rating.
pub async fn handle_comment(
    ctx: &Ctx,
    msg: &IncomingMessage,
    user: &User,
    product_id: i64,
) -> Result<()> {
    let text = msg.text.as_deref().unwrap_or("");

    if labels::is_cancel(text) || text == labels::SKIP {
        ctx.state.clear(msg.user_id);
        ctx.messenger
            .send_message(
                msg.chat_id,
                t(&user.language, "rate_thanks"),
                Some(keyboards::main_menu(&user.language)),
            )
            .await?;
        return Ok(());
    }

    Review::set_comment(&ctx.db.pool, user.id, product_id, text.trim()).await?;

    ctx.state.clear(msg.user_id);
    ctx.messenger
        .send_message(
            msg.chat_id,
            t(&user.language, "review_saved"),
            Some(keyboards::main_menu(&user.language)),
        )
        .await?;
    Ok(())
}
