//! Profile view with contact data and the loyalty balance.

use anyhow::Result;

use crate::bot::dispatcher::Ctx;
use crate::bot::keyboards;
use crate::database::models::{LoyaltyBalance, User};
use crate::utils::format::{escape_html, format_date};

pub async fn show(ctx: &Ctx, chat_id: i64, user: &User) -> Result<()> {
    let loyalty = LoyaltyBalance::for_user(&ctx.db.pool, user.id).await?;

    let mut text = "👤 <b>Ваш профиль</b>\n\n".to_string();
    text.push_str(&format!("📛 Имя: {}\n", escape_html(&user.name)));
    text.push_str(&format!(
        "📱 Телефон: {}\n",
        user.phone.as_deref().unwrap_or("не указан")
    ));
    text.push_str(&format!(
        "📧 Email: {}\n",
        user.email.as_deref().unwrap_or("не указан")
    ));
    text.push_str(&format!(
        "🌍 Язык: {}\n",
        if user.language == "uz" {
            "O'zbekcha"
        } else {
            "Русский"
        }
    ));
    text.push_str(&format!(
        "📅 С нами с: {}\n",
        format_date(&user.created_at)
    ));

    if let Some(loyalty) = loyalty {
        text.push_str("\n⭐ <b>Программа лояльности</b>\n");
        text.push_str(&format!("💎 Уровень: {}\n", loyalty.tier()));
        text.push_str(&format!("🏆 Баллы: {}\n", loyalty.points));
        text.push_str(&format!("📊 Всего заработано: {}\n", loyalty.total_earned));
        text.push_str("\n💡 Зарабатывайте 5% баллами с каждой покупки!");
    }

    ctx.messenger
        .send_message(chat_id, &text, Some(keyboards::main_menu(&user.language)))
        .await?;
    Ok(())
}
