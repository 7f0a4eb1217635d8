//! Subset of the Bot API object model.
//!
//! Unknown fields are ignored, so the same types accept both `getUpdates`
//! results and webhook payloads.

use grocery_core::types::TelegramId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub new_chat_members: Option<Vec<User>>,
    /// Legacy forward marker.
    #[serde(default)]
    pub forward_date: Option<i64>,
    /// Current forward marker (Bot API 7.0+).
    #[serde(default)]
    pub forward_origin: Option<serde_json::Value>,
}

impl Message {
    pub fn is_forwarded(&self) -> bool {
        self.forward_date.is_some() || self.forward_origin.is_some()
    }

    /// Sent in a one-to-one chat with the bot.
    pub fn is_private(&self) -> bool {
        self.chat.kind == "private"
            || self.from.as_ref().is_some_and(|user| user.id == self.chat.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: TelegramId,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    /// First and last name joined with a space.
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref().filter(|last| !last.is_empty()) {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: TelegramId,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Envelope wrapping every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<u16>,
}
