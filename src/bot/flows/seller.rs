//! Seller onboarding: name → phone → brand → products, then the application
//! is stored and fanned out to the admins.

use anyhow::Result;

use crate::bot::commands::labels;
use crate::bot::dispatcher::Ctx;
use crate::bot::keyboards;
use crate::bot::state::Step;
use crate::bot::update::IncomingMessage;
use crate::database::models::User;
use crate::localization::t;
use crate::utils::validation::{validate_name, validate_phone};

pub async fn start(ctx: &Ctx, msg: &IncomingMessage, user: &User) -> Result<()> {
    ctx.state.begin(msg.user_id, Step::SellerName);
    ctx.messenger
        .send_message(
            msg.chat_id,
            t(&user.language, "ask_name"),
            Some(keyboards::cancel_keyboard()),
        )
        .await?;
    Ok(())
}

pub async fn handle_step(ctx: &Ctx, msg: &IncomingMessage, user: &User, step: Step) -> Result<()> {
    let text = msg.text.as_deref().unwrap_or("");

    if labels::is_cancel(text) {
        ctx.state.clear(msg.user_id);
        ctx.messenger
            .send_message(
                msg.chat_id,
                t(&user.language, "cancelled"),
                Some(keyboards::main_menu(&user.language)),
            )
            .await?;
        return Ok(());
    }

    match step {
        Step::SellerName => handle_name(ctx, msg, text).await,
        Step::SellerPhone => handle_phone(ctx, msg, text).await,
        Step::SellerBrand => handle_brand(ctx, msg, text).await,
        Step::SellerProducts => handle_products(ctx, msg, user, text).await,
        _ => Ok(()),
    }
}

async fn handle_name(ctx: &Ctx, msg: &IncomingMessage, text: &str) -> Result<()> {
    let name = match validate_name(text) {
        Ok(name) => name,
        Err(_) => {
            ctx.messenger
                .send_message(msg.chat_id, t("ru", "name_too_short"), None)
                .await?;
            return Ok(());
        }
    };

    ctx.state.set(msg.user_id, Step::SellerPhone, &[("name", name)]);
    ctx.messenger
        .send_message(
            msg.chat_id,
            "📱 Укажите ваш номер телефона (например, +998 90 123 45 67):",
            None,
        )
        .await?;
    Ok(())
}

async fn handle_phone(ctx: &Ctx, msg: &IncomingMessage, text: &str) -> Result<()> {
    let phone = match msg.contact_phone.clone().or_else(|| validate_phone(text)) {
        Some(phone) => phone,
        None => {
            ctx.messenger
                .send_message(msg.chat_id, t("ru", "bad_phone"), None)
                .await?;
            return Ok(());
        }
    };

    ctx.state
        .set(msg.user_id, Step::SellerBrand, &[("phone", phone)]);
    ctx.messenger
        .send_message(msg.chat_id, "🏷 Название вашего бренда или компании:", None)
        .await?;
    Ok(())
}

async fn handle_brand(ctx: &Ctx, msg: &IncomingMessage, text: &str) -> Result<()> {
    if text.trim().chars().count() < 2 {
        ctx.messenger
            .send_message(
                msg.chat_id,
                "❌ Слишком коротко. Введите название бренда/компании:",
                None,
            )
            .await?;
        return Ok(());
    }

    ctx.state.set(
        msg.user_id,
        Step::SellerProducts,
        &[("brand", text.trim().to_string())],
    );
    ctx.messenger
        .send_message(
            msg.chat_id,
            "🛍 Что вы продаёте? Кратко опишите товары/категории:",
            None,
        )
        .await?;
    Ok(())
}

async fn handle_products(ctx: &Ctx, msg: &IncomingMessage, user: &User, text: &str) -> Result<()> {
    if text.trim().chars().count() < 2 {
        ctx.messenger
            .send_message(msg.chat_id, "❌ Слишком коротко. Опишите, что вы продаёте:", None)
            .await?;
        return Ok(());
    }

    let name = ctx.state.scratch(msg.user_id, "name").unwrap_or_default();
    let phone = ctx.state.scratch(msg.user_id, "phone").unwrap_or_default();
    let brand = ctx.state.scratch(msg.user_id, "brand").unwrap_or_default();
    let products = text.trim().to_string();

    sqlx::query(
        "INSERT INTO seller_applications (user_id, name, phone, brand, products) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(user.id)
    .bind(&name)
    .bind(&phone)
    .bind(&brand)
    .bind(&products)
    .execute(&ctx.db.pool)
    .await?;

    ctx.notifier
        .seller_application(&name, &phone, &brand, &products)
        .await?;

    ctx.state.clear(msg.user_id);
    ctx.messenger
        .send_message(
            msg.chat_id,
            t(&user.language, "seller_thanks"),
            Some(keyboards::main_menu(&user.language)),
        )
        .await?;
    Ok(())
}
