use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, InputFile, ParseMode, ReplyMarkup};

/// Outbound capability boundary towards the messaging platform.
///
/// The dispatcher and services only talk to Telegram through this trait;
/// tests substitute a recording mock.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<ReplyMarkup>,
    ) -> Result<()>;

    async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        caption: &str,
        keyboard: Option<ReplyMarkup>,
    ) -> Result<()>;

    async fn edit_reply_markup(
        &self,
        chat_id: i64,
        message_id: i32,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<()>;

    /// Short acknowledgement toast for a callback press.
    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<()>;
}

/// The production messenger: a thin wrapper over `teloxide::Bot` that fixes
/// the parse mode to HTML.
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<ReplyMarkup>,
    ) -> Result<()> {
        let mut request = self
            .bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Html);
        if let Some(markup) = keyboard {
            request = request.reply_markup(markup);
        }
        request
            .await
            .with_context(|| format!("sendMessage to chat {chat_id} failed"))?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        caption: &str,
        keyboard: Option<ReplyMarkup>,
    ) -> Result<()> {
        let photo = url::Url::parse(photo_url)
            .with_context(|| format!("invalid photo url: {photo_url}"))?;
        let mut request = self
            .bot
            .send_photo(ChatId(chat_id), InputFile::url(photo))
            .caption(caption)
            .parse_mode(ParseMode::Html);
        if let Some(markup) = keyboard {
            request = request.reply_markup(markup);
        }
        request
            .await
            .with_context(|| format!("sendPhoto to chat {chat_id} failed"))?;
        Ok(())
    }

    async fn edit_reply_markup(
        &self,
        chat_id: i64,
        message_id: i32,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<()> {
        self.bot
            .edit_message_reply_markup(ChatId(chat_id), teloxide::types::MessageId(message_id))
            .reply_markup(keyboard)
            .await
            .with_context(|| format!("editMessageReplyMarkup in chat {chat_id} failed"))?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<()> {
        self.bot
            .answer_callback_query(callback_id.to_string())
            .text(text)
            .await
            .context("answerCallbackQuery failed")?;
        Ok(())
    }
}
