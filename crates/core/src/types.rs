/// Request primary keys are SQLite `INTEGER PRIMARY KEY` rowids.
pub type DbId = i64;

/// Telegram user and chat identifiers. Opaque to the store.
pub type TelegramId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
