#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use grocery_bot::dispatch::{BotIdentity, Dispatcher};
use grocery_bot::lifecycle::Lifecycle;
use grocery_bot::notify::Notifier;
use grocery_core::roles::CoordinatorSet;
use grocery_core::types::TelegramId;
use grocery_db::DbPool;
use grocery_translate::{TranslateError, Translator};
use serde_json::json;
use tempfile::TempDir;

pub const COORDINATOR: TelegramId = 900;
pub const VOLUNTEER_CHAT: TelegramId = -100_555;
pub const BOT_ID: TelegramId = 4242;

/// A migrated database in a throwaway directory.
pub struct TestDb {
    pub pool: DbPool,
    _dir: TempDir,
}

pub async fn test_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("bot.db").display());
    let pool = grocery_db::create_pool(&url).await.unwrap();
    grocery_db::run_migrations(&pool).await.unwrap();
    TestDb { pool, _dir: dir }
}

/// Prefixes each comma-separated item with a bullet, or fails on demand.
#[derive(Default)]
pub struct FakeTranslator {
    pub fail: std::sync::atomic::AtomicBool,
}

impl FakeTranslator {
    pub fn failing() -> Self {
        Self {
            fail: std::sync::atomic::AtomicBool::new(true),
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl Translator for FakeTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(TranslateError::Empty);
        }
        Ok(text
            .split(',')
            .map(|item| format!("• {}", item.trim()))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Records every outbound message.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(TelegramId, String)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(TelegramId, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat_id: TelegramId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, text)| text)
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, chat_id: TelegramId, text: &str) {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
    }
}

pub fn lifecycle(pool: &DbPool, translator: Arc<FakeTranslator>) -> Lifecycle {
    Lifecycle::new(
        pool.clone(),
        CoordinatorSet::new([COORDINATOR]).unwrap(),
        translator,
    )
}

pub struct Harness {
    pub db: TestDb,
    pub translator: Arc<FakeTranslator>,
    pub notifier: Arc<RecordingNotifier>,
    pub lifecycle: Arc<Lifecycle>,
    pub dispatcher: Arc<Dispatcher>,
}

pub async fn harness() -> Harness {
    let db = test_db().await;
    let translator = Arc::new(FakeTranslator::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let lifecycle = Arc::new(lifecycle(&db.pool, Arc::clone(&translator)));
    lifecycle.seed_coordinators().await.unwrap();
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&lifecycle),
        notifier.clone(),
        VOLUNTEER_CHAT,
        BotIdentity {
            id: BOT_ID,
            username: Some("GroceryBot".into()),
        },
    ));
    Harness {
        db,
        translator,
        notifier,
        lifecycle,
        dispatcher,
    }
}

/// A text message update from `user_id` in `chat_id`.
pub fn text_update(user_id: TelegramId, chat_id: TelegramId, text: &str) -> grocery_bot::telegram::Update {
    let kind = if chat_id == user_id { "private" } else { "supergroup" };
    serde_json::from_value(json!({
        "update_id": 1,
        "message": {
            "message_id": 1,
            "from": { "id": user_id, "is_bot": false, "first_name": format!("User{user_id}") },
            "chat": { "id": chat_id, "type": kind },
            "date": 1700000000,
            "text": text
        }
    }))
    .unwrap()
}
