//! Bot command parsing.

use grocery_core::types::DbId;

/// A slash command and its raw argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    List,
    Claim(String),
    Mine,
    Done(String),
    Cancel(String),
    New(String),
    Status,
    Approve(String),
    Address(String),
    View(String),
    Shopping(String),
    Retry(String),
    /// Any other command, by lowercase name.
    Unknown(String),
}

impl Command {
    /// Parse message text such as `/claim 42` or `/claim@GroceryBot 42`.
    ///
    /// Returns `None` when the text is not a command, or is a command
    /// addressed to a different bot. Arguments keep their inner line
    /// breaks so `/new` can carry a multi-line list.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let text = text.trim_start();
        let body = text.strip_prefix('/')?;

        let (head, args) = match body.find(char::is_whitespace) {
            Some(pos) => (&body[..pos], body[pos..].trim()),
            None => (body, ""),
        };

        let (name, mention) = match head.split_once('@') {
            Some((name, mention)) => (name, Some(mention)),
            None => (head, None),
        };
        if name.is_empty() {
            return None;
        }
        if let (Some(mention), Some(bot)) = (mention, bot_username) {
            if !mention.eq_ignore_ascii_case(bot) {
                return None;
            }
        }

        let args = args.to_string();
        let command = match name.to_ascii_lowercase().as_str() {
            "start" => Self::Start,
            "help" => Self::Help,
            "list" => Self::List,
            "claim" => Self::Claim(args),
            "mine" => Self::Mine,
            "done" => Self::Done(args),
            "cancel" => Self::Cancel(args),
            "new" => Self::New(args),
            "status" => Self::Status,
            "approve" => Self::Approve(args),
            "address" => Self::Address(args),
            "view" => Self::View(args),
            "shopping" => Self::Shopping(args),
            "retry" => Self::Retry(args),
            other => Self::Unknown(other.to_string()),
        };
        Some(command)
    }

    /// Command name without arguments, safe to log.
    pub fn name(&self) -> &str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::List => "list",
            Self::Claim(_) => "claim",
            Self::Mine => "mine",
            Self::Done(_) => "done",
            Self::Cancel(_) => "cancel",
            Self::New(_) => "new",
            Self::Status => "status",
            Self::Approve(_) => "approve",
            Self::Address(_) => "address",
            Self::View(_) => "view",
            Self::Shopping(_) => "shopping",
            Self::Retry(_) => "retry",
            Self::Unknown(name) => name,
        }
    }
}

/// Parse a request id argument; a leading `#` is allowed.
pub fn parse_id(args: &str) -> Option<DbId> {
    let token = args.split_whitespace().next()?;
    token.trim_start_matches('#').parse().ok().filter(|id| *id > 0)
}

/// Split `/address` arguments into the request id and the address text.
pub fn parse_address(args: &str) -> Option<(DbId, &str)> {
    let (id, address) = args.trim().split_once(char::is_whitespace)?;
    let address = address.trim();
    if address.is_empty() {
        return None;
    }
    Some((parse_id(id)?, address))
}
