#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use tempfile::TempDir;
use teloxide::types::{InlineKeyboardMarkup, ReplyMarkup};

use shopfront_bot::bot::dispatcher::{Ctx, UpdateDispatcher};
use shopfront_bot::bot::messenger::Messenger;
use shopfront_bot::bot::state::StateStore;
use shopfront_bot::bot::update::{IncomingCallback, IncomingMessage, IncomingUpdate};
use shopfront_bot::database::connection::DatabaseManager;
use shopfront_bot::database::models::User;
use shopfront_bot::services::cache::CatalogCache;
use shopfront_bot::services::metrics::Metrics;
use shopfront_bot::services::notify::AdminNotifier;

/// One outbound platform call recorded by the mock.
#[derive(Debug, Clone)]
pub enum Sent {
    Message {
        chat_id: i64,
        text: String,
        has_keyboard: bool,
    },
    Photo {
        chat_id: i64,
        url: String,
        caption: String,
    },
    EditMarkup {
        chat_id: i64,
        message_id: i32,
    },
    CallbackAnswer {
        callback_id: String,
        text: String,
    },
}

/// Records every outbound call instead of talking to Telegram.
#[derive(Default)]
pub struct MockMessenger {
    pub sent: Mutex<Vec<Sent>>,
}

impl MockMessenger {
    fn push(&self, entry: Sent) {
        self.sent.lock().unwrap().push(entry);
    }

    pub fn all(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts of all plain messages, in send order.
    pub fn message_texts(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Message { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn messages_to(&self, chat_id: i64) -> Vec<String> {
        self.all()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Message {
                    chat_id: c, text, ..
                } if c == chat_id => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn last_message_text(&self) -> Option<String> {
        self.message_texts().pop()
    }

    pub fn callback_answers(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter_map(|s| match s {
                Sent::CallbackAnswer { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<ReplyMarkup>,
    ) -> Result<()> {
        self.push(Sent::Message {
            chat_id,
            text: text.to_string(),
            has_keyboard: keyboard.is_some(),
        });
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        photo_url: &str,
        caption: &str,
        _keyboard: Option<ReplyMarkup>,
    ) -> Result<()> {
        self.push(Sent::Photo {
            chat_id,
            url: photo_url.to_string(),
            caption: caption.to_string(),
        });
        Ok(())
    }

    async fn edit_reply_markup(
        &self,
        chat_id: i64,
        message_id: i32,
        _keyboard: InlineKeyboardMarkup,
    ) -> Result<()> {
        self.push(Sent::EditMarkup {
            chat_id,
            message_id,
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str, text: &str) -> Result<()> {
        self.push(Sent::CallbackAnswer {
            callback_id: callback_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}

/// Fresh per-test database plus a fully wired dispatcher context.
pub struct TestHarness {
    pub dispatcher: UpdateDispatcher,
    pub db: DatabaseManager,
    pub messenger: Arc<MockMessenger>,
    pub cache: CatalogCache,
    pub state: StateStore,
    _temp_dir: TempDir,
}

pub async fn setup() -> TestHarness {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let db = DatabaseManager::new(&database_url)
        .await
        .expect("Failed to create test database");
    db.run_migrations().await.expect("Failed to run migrations");

    let messenger = Arc::new(MockMessenger::default());
    let cache = CatalogCache::new();
    let state = StateStore::new();
    let notifier = AdminNotifier::new(messenger.clone(), db.clone());

    let ctx = Ctx {
        messenger: messenger.clone(),
        db: db.clone(),
        state: state.clone(),
        cache: cache.clone(),
        notifier,
        metrics: Metrics::new(),
    };

    TestHarness {
        dispatcher: UpdateDispatcher::new(ctx),
        db,
        messenger,
        cache,
        state,
        _temp_dir: temp_dir,
    }
}

// Update builders. Private chats: chat id equals the user's Telegram id.

pub fn text_msg(user_id: i64, text: &str) -> IncomingUpdate {
    IncomingUpdate::Message(IncomingMessage {
        user_id,
        chat_id: user_id,
        text: Some(text.to_string()),
        contact_phone: None,
        location: None,
        first_name: "Test".to_string(),
        last_name: None,
    })
}

pub fn contact_msg(user_id: i64, phone: &str) -> IncomingUpdate {
    IncomingUpdate::Message(IncomingMessage {
        user_id,
        chat_id: user_id,
        text: None,
        contact_phone: Some(phone.to_string()),
        location: None,
        first_name: "Test".to_string(),
        last_name: None,
    })
}

pub fn location_msg(user_id: i64, lat: f64, lon: f64) -> IncomingUpdate {
    IncomingUpdate::Message(IncomingMessage {
        user_id,
        chat_id: user_id,
        text: None,
        contact_phone: None,
        location: Some((lat, lon)),
        first_name: "Test".to_string(),
        last_name: None,
    })
}

pub fn callback(user_id: i64, data: &str) -> IncomingUpdate {
    IncomingUpdate::Callback(IncomingCallback {
        user_id,
        chat_id: user_id,
        message_id: Some(100),
        callback_id: format!("cb-{user_id}-{data}"),
        data: data.to_string(),
    })
}

// Seed helpers

pub async fn seed_user(db: &DatabaseManager, telegram_id: i64, name: &str) -> User {
    User::create(&db.pool, telegram_id, name, None, None, "ru")
        .await
        .expect("Failed to seed user")
}

pub async fn seed_admin(db: &DatabaseManager, telegram_id: i64, name: &str) -> User {
    let user = seed_user(db, telegram_id, name).await;
    sqlx::query("UPDATE users SET is_admin = 1 WHERE id = ?")
        .bind(user.id)
        .execute(&db.pool)
        .await
        .expect("Failed to promote admin");
    User::find_by_telegram_id(&db.pool, telegram_id)
        .await
        .expect("Failed to reload admin")
        .expect("Admin vanished")
}

pub async fn seed_category(db: &DatabaseManager, name: &str, emoji: &str) -> i64 {
    sqlx::query("INSERT INTO categories (name, emoji) VALUES (?, ?)")
        .bind(name)
        .bind(emoji)
        .execute(&db.pool)
        .await
        .expect("Failed to seed category")
        .last_insert_rowid()
}

pub async fn seed_product(
    db: &DatabaseManager,
    name: &str,
    price: f64,
    category_id: Option<i64>,
) -> i64 {
    sqlx::query(
        "INSERT INTO products (name, description, price, category_id, stock) VALUES (?, ?, ?, ?, 10)",
    )
    .bind(name)
    .bind(format!("Описание {name}"))
    .bind(price)
    .bind(category_id)
    .execute(&db.pool)
    .await
    .expect("Failed to seed product")
    .last_insert_rowid()
}

pub async fn add_to_cart(db: &DatabaseManager, user_id: i64, product_id: i64, quantity: i64) {
    sqlx::query("INSERT INTO cart (user_id, product_id, quantity) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .execute(&db.pool)
        .await
        .expect("Failed to seed cart item");
}
