//! Language change flow.

use anyhow::Result;

use crate::bot::commands::labels;
use crate::bot::dispatcher::Ctx;
use crate::bot::keyboards;
use crate::bot::state::Step;
use crate::bot::update::IncomingMessage;
use crate::database::models::User;
use crate::localization::t;

pub async fn start(ctx: &Ctx, msg: &IncomingMessage) -> Result<()> {
    ctx.state.begin(msg.user_id, Step::ChangingLanguage);
    ctx.messenger
        .send_message(
            msg.chat_id,
            t("ru", "ask_language"),
            Some(keyboards::language_keyboard()),
        )
        .await?;
    Ok(())
}

pub async fn handle_choice(ctx: &Ctx, msg: &IncomingMessage, user: &User) -> Result<()> {
    let text = msg.text.as_deref().unwrap_or("");

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

    let language = match text {
        labels::LANG_RU => "ru",
        labels::LANG_UZ => "uz",
        _ => {
            ctx.messenger
                .send_message(msg.chat_id, t(&user.language, "pick_language"), None)
                .await?;
            return Ok(());
        }
    };

    User::update_language(&ctx.db.pool, user.id, language).await?;

    ctx.state.clear(msg.user_id);
    ctx.messenger
        .send_message(
            msg.chat_id,
            t(language, "language_changed"),
            Some(keyboards::main_menu(language)),
        )
        .await?;
    Ok(())
}
