//! Product search. The `Searching` step consumes exactly one query; free
//! text that matched nothing in the static tables lands in the same
//! rendering as a fallback.

use anyhow::Result;

use crate::bot::commands::labels;
use crate::bot::dispatcher::Ctx;
use crate::bot::keyboards;
use crate::bot::state::Step;
use crate::bot::update::IncomingMessage;
use crate::database::models::{Product, User};
use crate::localization::t;
use crate::utils::format::{escape_html, format_price};

const MAX_RESULTS: i64 = 10;

pub async fn start(ctx: &Ctx, msg: &IncomingMessage, user: &User) -> Result<()> {
    ctx.state.begin(msg.user_id, Step::Searching);
    ctx.messenger
        .send_message(
            msg.chat_id,
            t(&user.language, "search_prompt"),
            Some(keyboards::back_keyboard()),
        )
        .await?;
    Ok(())
}

/// Step handler: runs the query and always clears the step afterwards.
pub async fn handle_query(ctx: &Ctx, msg: &IncomingMessage, user: &User) -> Result<()> {
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

    let outcome = run_search(ctx, msg.chat_id, text).await;
    ctx.state.clear(msg.user_id);
    outcome
}

/// Dispatcher fallback for unmatched free text; no state involved.
pub async fn fallback(ctx: &Ctx, msg: &IncomingMessage, text: &str) -> Result<()> {
    run_search(ctx, msg.chat_id, text).await
}

async fn run_search(ctx: &Ctx, chat_id: i64, query: &str) -> Result<()> {
    let products = Product::search(&ctx.db.pool, query, MAX_RESULTS).await?;

    if products.is_empty() {
        let mut text = format!("❌ По запросу '{}' ничего не найдено\n\n", escape_html(query));
        text.push_str("💡 Попробуйте:\n");
        text.push_str("• Изменить запрос\n");
        text.push_str("• Использовать другие ключевые слова\n");
        text.push_str("• Просмотреть каталог");

        ctx.messenger
            .send_message(chat_id, &text, Some(keyboards::back_keyboard()))
            .await?;
        return Ok(());
    }

    let mut text = format!(
        "🔍 <b>Результаты поиска:</b> '{}'\n\n",
        escape_html(query)
    );
    for product in &products {
        text.push_str(&format!("🛍 <b>{}</b>\n", escape_html(&product.name)));
        text.push_str(&format!("💰 {}\n", format_price(product.price)));
        text.push_str(&format!("📦 В наличии: {} шт.\n\n", product.stock));
    }
    text.push_str("💡 Нажмите на название товара для подробностей");

    ctx.messenger
        .send_message(chat_id, &text, Some(keyboards::products_keyboard(&products)))
        .await?;
    Ok(())
}
