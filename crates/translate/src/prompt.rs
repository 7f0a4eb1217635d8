//! Prompt sent to chat-completion backends.

/// Instructions for turning a Spanish grocery request into an English
/// bullet list.
pub const SYSTEM_PROMPT: &str = "\
You translate grocery requests from Spanish into English for volunteer shoppers.
Return only a bullet list, one item per line, each line starting with \"• \".
Keep quantities, units, brands and sizes exactly as written.
Keep any notes about substitutions or preferences as their own bullet.
Do not add items, prices, greetings or commentary.";

/// Build the user message for one request.
pub fn user_message(text: &str) -> String {
    format!("Grocery request:\n{}", text.trim())
}
