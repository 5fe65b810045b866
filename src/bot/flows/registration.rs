//! Registration flow: name → phone (or skip) → email (or skip) → language.
//!
//! Collected values sit in scratch until the language step commits exactly
//! one user row; skipped fields are stored as NULL.

use anyhow::Result;

use crate::bot::commands::labels;
use crate::bot::dispatcher::Ctx;
use crate::bot::keyboards;
use crate::bot::state::Step;
use crate::bot::update::IncomingMessage;
use crate::database::models::User;
use crate::localization::t;
use crate::utils::validation::{validate_email, validate_name, validate_phone};

pub async fn start(ctx: &Ctx, msg: &IncomingMessage) -> Result<()> {
    ctx.messenger
        .send_message(msg.chat_id, t("ru", "welcome_new"), None)
        .await?;
    ctx.messenger
        .send_message(
            msg.chat_id,
            t("ru", "ask_name"),
            Some(keyboards::registration_name(&msg.profile_name())),
        )
        .await?;

    ctx.state.begin(msg.user_id, Step::RegistrationName);
    Ok(())
}

pub async fn handle_step(ctx: &Ctx, msg: &IncomingMessage, step: Step) -> Result<()> {
    match step {
        Step::RegistrationName => handle_name(ctx, msg).await,
        Step::RegistrationPhone => handle_phone(ctx, msg).await,
        Step::RegistrationEmail => handle_email(ctx, msg).await,
        Step::RegistrationLanguage => handle_language(ctx, msg).await,
        // Routed here only for the four steps above.
        _ => Ok(()),
    }
}

async fn cancel(ctx: &Ctx, msg: &IncomingMessage) -> Result<()> {
    ctx.state.clear(msg.user_id);
    ctx.messenger
        .send_message(msg.chat_id, t("ru", "registration_cancelled"), None)
        .await?;
    Ok(())
}

async fn handle_name(ctx: &Ctx, msg: &IncomingMessage) -> Result<()> {
    let text = msg.text.as_deref().unwrap_or("");

    if labels::is_cancel(text) {
        return cancel(ctx, msg).await;
    }

    let name = match validate_name(text) {
        Ok(name) => name,
        Err(_) => {
            // Re-prompt, step unchanged
            ctx.messenger
                .send_message(msg.chat_id, t("ru", "name_too_short"), None)
                .await?;
            return Ok(());
        }
    };

    ctx.state
        .set(msg.user_id, Step::RegistrationPhone, &[("name", name)]);
    ctx.messenger
        .send_message(
            msg.chat_id,
            t("ru", "ask_phone"),
            Some(keyboards::registration_phone()),
        )
        .await?;
    Ok(())
}

async fn handle_phone(ctx: &Ctx, msg: &IncomingMessage) -> Result<()> {
    let text = msg.text.as_deref().unwrap_or("");

    if labels::is_cancel(text) {
        return cancel(ctx, msg).await;
    }

    let mut patch: Vec<(&str, String)> = Vec::new();

    if let Some(phone) = &msg.contact_phone {
        patch.push(("phone", phone.clone()));
    } else if text != labels::SKIP {
        match validate_phone(text) {
            Some(phone) => patch.push(("phone", phone)),
            None => {
                ctx.messenger
                    .send_message(msg.chat_id, t("ru", "bad_phone"), None)
                    .await?;
                return Ok(());
            }
        }
    }

    ctx.state.set(msg.user_id, Step::RegistrationEmail, &patch);
    ctx.messenger
        .send_message(
            msg.chat_id,
            t("ru", "ask_email"),
            Some(keyboards::skip_cancel_keyboard()),
        )
        .await?;
    Ok(())
}

async fn handle_email(ctx: &Ctx, msg: &IncomingMessage) -> Result<()> {
    let text = msg.text.as_deref().unwrap_or("");

    if labels::is_cancel(text) {
        return cancel(ctx, msg).await;
    }

    let mut patch: Vec<(&str, String)> = Vec::new();

    if text != labels::SKIP {
        if !validate_email(text) {
            ctx.messenger
                .send_message(msg.chat_id, t("ru", "bad_email"), None)
                .await?;
            return Ok(());
        }
        patch.push(("email", text.to_string()));
    }

    ctx.state
        .set(msg.user_id, Step::RegistrationLanguage, &patch);
    ctx.messenger
        .send_message(
            msg.chat_id,
            t("ru", "ask_language"),
            Some(keyboards::language_keyboard()),
        )
        .await?;
    Ok(())
}

async fn handle_language(ctx: &Ctx, msg: &IncomingMessage) -> Result<()> {
    let text = msg.text.as_deref().unwrap_or("");

    if labels::is_cancel(text) {
        return cancel(ctx, msg).await;
    }

    let language = match text {
        labels::LANG_RU => "ru",
        labels::LANG_UZ => "uz",
        _ => {
            ctx.messenger
                .send_message(msg.chat_id, t("ru", "pick_language"), None)
                .await?;
            return Ok(());
        }
    };

    let name = ctx
        .state
        .scratch(msg.user_id, "name")
        .unwrap_or_else(|| msg.profile_name());
    let phone = ctx.state.scratch(msg.user_id, "phone");
    let email = ctx.state.scratch(msg.user_id, "email");

    User::create(
        &ctx.db.pool,
        msg.user_id,
        &name,
        phone.as_deref(),
        email.as_deref(),
        language,
    )
    .await?;

    ctx.state.clear(msg.user_id);
    ctx.messenger
        .send_message(
            msg.chat_id,
            t(language, "registration_complete"),
            Some(keyboards::main_menu(language)),
        )
        .await?;
    Ok(())
}
