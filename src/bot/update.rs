use teloxide::types::{CallbackQuery, Message};

/// A platform update normalized to what the dispatcher needs.
#[derive(Debug, Clone)]
pub enum IncomingUpdate {
    Message(IncomingMessage),
    Callback(IncomingCallback),
}

#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub user_id: i64,
    pub chat_id: i64,
    pub text: Option<String>,
    /// Phone number from a shared contact card.
    pub contact_phone: Option<String>,
    /// Shared location, `(latitude, longitude)`.
    pub location: Option<(f64, f64)>,
    /// Sender's profile name, suggested during registration.
    pub first_name: String,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IncomingCallback {
    pub user_id: i64,
    pub chat_id: i64,
    pub message_id: Option<i32>,
    pub callback_id: String,
    pub data: String,
}

impl IncomingUpdate {
    pub fn user_id(&self) -> i64 {
        match self {
            IncomingUpdate::Message(m) => m.user_id,
            IncomingUpdate::Callback(c) => c.user_id,
        }
    }

    pub fn chat_id(&self) -> i64 {
        match self {
            IncomingUpdate::Message(m) => m.chat_id,
            IncomingUpdate::Callback(c) => c.chat_id,
        }
    }

    /// Messages without a sender (channel posts and the like) are not
    /// dispatched.
    pub fn from_message(msg: &Message) -> Option<Self> {
        let from = msg.from()?;
        Some(IncomingUpdate::Message(IncomingMessage {
            user_id: from.id.0 as i64,
            chat_id: msg.chat.id.0,
            text: msg.text().map(|t| t.to_string()),
            contact_phone: msg.contact().map(|c| c.phone_number.clone()),
            location: msg.location().map(|l| (l.latitude, l.longitude)),
            first_name: from.first_name.clone(),
            last_name: from.last_name.clone(),
        }))
    }

    pub fn from_callback(q: &CallbackQuery) -> Option<Self> {
        let data = q.data.clone()?;
        Some(IncomingUpdate::Callback(IncomingCallback {
            user_id: q.from.id.0 as i64,
            chat_id: q
                .message
                .as_ref()
                .map(|m| m.chat.id.0)
                .unwrap_or(q.from.id.0 as i64),
            message_id: q.message.as_ref().map(|m| m.id.0),
            callback_id: q.id.clone(),
            data,
        }))
    }
}

impl IncomingMessage {
    /// Sender's display name, used as the suggested registration name.
    pub fn profile_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}
