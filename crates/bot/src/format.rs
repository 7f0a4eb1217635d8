//! Chat message rendering.
//!
//! Public texts (the posting card, the open list, the public view) never
//! include an address. Details with an address go to direct messages only.

use std::fmt::Write;

use grocery_core::status::RequestStatus;
use grocery_core::types::{DbId, TelegramId};
use grocery_db::models::request::Request;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const MAX_PREVIEW_ITEMS: usize = 5;
const PREVIEW_CHARS: usize = 60;

pub const HELP: &str = "Commands:
/list - See open requests
/claim <id> - Claim a request
/mine - See your claimed requests
/shopping <id> - Mark that you are shopping
/done <id> - Mark a request as delivered
/cancel <id> - Ask a coordinator to release your claim
/view <id> - See a request's full list
/help - Show this help message";

pub const COORDINATOR_HELP: &str = "Coordinators:
/new <text> - Create a new request (DM only)
/address <id> <address> - Set the delivery address (DM only)
/retry <id> - Retry translating a request
/approve <user_id> - Approve a volunteer
/status - See all request statuses";

pub fn start() -> String {
    format!("Welcome to the Grocery Coordination Bot!\n\n{HELP}")
}

pub fn help(is_coordinator: bool) -> String {
    if is_coordinator {
        format!("{HELP}\n\n{COORDINATOR_HELP}")
    } else {
        HELP.to_string()
    }
}

/// Greeting posted in the volunteer group when someone joins.
pub fn welcome(name: &str) -> String {
    let name = if name.trim().is_empty() { "there" } else { name };
    format!(
        "Welcome {name}! Thank you for joining the grocery volunteers.

HOW THIS WORKS:
Families in our community need help getting groceries. When a request comes in, you'll see it posted here with a shopping list and budget.

COMMANDS:
/list - See open grocery requests
/claim <id> - Claim a request to shop for
/mine - See requests you've claimed
/done <id> - Mark a delivery as complete
/help - Full command list

QUICK START:
1. When you see a request, type /claim followed by the request number
2. You'll receive the address via DM (private message)
3. Shop for the items, deliver them, then type /done with the request number

Questions? Reach out to a coordinator. We're glad you're here!"
    )
}

pub fn new_member_notice(display_name: &str, username: &str, id: TelegramId) -> String {
    format!("New volunteer joined: {display_name} (@{username}, ID: {id})\nApprove with /approve {id}")
}

/// The card posted to the volunteer group when a request goes live.
pub fn posting_card(request: &Request) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = write!(out, "📋 REQUEST #{}", request.id);
    if let Some(zone) = &request.zone {
        let _ = write!(out, " • {zone}");
    }
    out.push('\n');
    if let Some(budget) = &request.budget {
        let _ = writeln!(out, "💵 {budget}");
    }
    let _ = writeln!(out, "{RULE}\n");
    out.push_str(shopping_list(request));
    let _ = writeln!(out, "\n\n{RULE}");
    let _ = writeln!(out, "Reply /claim {} to take this request", request.id);
    out.push_str(RULE);
    out
}

/// The `/list` overview with a short preview of each shopping list.
pub fn open_list(requests: &[Request]) -> String {
    if requests.is_empty() {
        return "No open requests at the moment. Check back later!".to_string();
    }

    let mut out = format!("📋 OPEN REQUESTS ({})\n\n", requests.len());
    for request in requests {
        let _ = write!(out, "━━━ #{}", request.id);
        if let Some(zone) = &request.zone {
            let _ = write!(out, " • {zone}");
        }
        out.push('\n');
        if let Some(budget) = &request.budget {
            let _ = writeln!(out, "💵 {budget}");
        }
        out.push_str(&preview(shopping_list(request)));
        let _ = write!(
            out,
            "\n→ /claim {id} or /view {id} for full list\n\n",
            id = request.id
        );
    }
    out.trim_end().to_string()
}

/// Direct message to a volunteer who just claimed a request.
pub fn claim_details(request: &Request, address: Option<&str>) -> String {
    format!(
        "✅ CLAIMED! Request #{id} is yours.\n\n\
         📍 ADDRESS:\n{address}\n\n\
         💵 BUDGET: {budget}\n\n\
         SHOPPING LIST:\n{list}\n\n\
         {RULE}\n\
         When shopping: /shopping {id}\n\
         When done: /done {id}",
        id = request.id,
        address = address.unwrap_or("Address not available - contact coordinator"),
        budget = request.budget.as_deref().unwrap_or("not specified"),
        list = shopping_list(request),
    )
}

pub fn claim_ack(id: DbId, volunteer_name: &str) -> String {
    format!("✅ Request #{id} claimed by {volunteer_name}. Details sent via DM.")
}

/// The `/mine` listing.
pub fn my_requests(requests: &[Request]) -> String {
    if requests.is_empty() {
        return "You don't have any active claims. Use /list to see open requests.".to_string();
    }

    let mut out = String::from("📋 YOUR CLAIMED REQUESTS\n\n");
    for request in requests {
        let _ = writeln!(out, "━━━ #{} • {}", request.id, request.status);
        let _ = writeln!(
            out,
            "Budget: {}",
            request.budget.as_deref().unwrap_or("not specified")
        );
        if request.status == RequestStatus::Claimed {
            let _ = writeln!(out, "→ /shopping {} when you head out", request.id);
        }
        let _ = writeln!(out, "→ /done {} when delivered\n", request.id);
    }
    out.trim_end().to_string()
}

/// The `/view` text. The address is only appended when given.
pub fn request_view(request: &Request, address: Option<&str>) -> String {
    let mut out = format!("━━━ REQUEST #{} ━━━\n\n", request.id);
    let _ = writeln!(out, "Status: {}", request.status);
    if let Some(budget) = &request.budget {
        let _ = writeln!(out, "Budget: {budget}");
    }
    let _ = write!(out, "\nShopping list:\n{}", shopping_list(request));
    if let Some(name) = &request.claimed_by_name {
        let _ = write!(out, "\n\nClaimed by: {name}");
    }
    if let Some(address) = address {
        let _ = write!(out, "\n\n📍 Address: {address}");
    }
    out
}

/// The `/status` summary.
pub fn status_summary(counts: &[(RequestStatus, i64)]) -> String {
    let mut out = String::from("📊 STATUS\n\n");
    for (status, count) in counts {
        let _ = writeln!(out, "{status}: {count}");
    }
    out.push_str("\nUse /list to see open requests.");
    out
}

/// The translated list, or a placeholder while translation is pending.
/// The untranslated original is never shown publicly.
fn shopping_list(request: &Request) -> &str {
    request
        .translated_text
        .as_deref()
        .unwrap_or("(translation pending)")
}

fn is_item_line(line: &str) -> bool {
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some('•'), _) | (Some('-'), _) => true,
        (Some(d), Some('.')) => d.is_ascii_digit() && line.chars().count() > 2,
        _ => false,
    }
}

fn count_bullets(text: &str) -> usize {
    text.lines()
        .filter(|line| line.trim_start().starts_with('•'))
        .count()
}

/// Up to five list items, or the first line shortened when the text has
/// no list formatting.
fn preview(text: &str) -> String {
    let items: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| is_item_line(line))
        .collect();

    let mut out = String::new();
    if items.is_empty() {
        if let Some(first) = text.lines().map(str::trim).find(|line| !line.is_empty()) {
            if first.chars().count() > PREVIEW_CHARS {
                let cut: String = first.chars().take(PREVIEW_CHARS).collect();
                let _ = writeln!(out, "{cut}...");
            } else {
                let _ = writeln!(out, "{first}");
            }
        }
        return out;
    }

    let shown = items.len().min(MAX_PREVIEW_ITEMS);
    for item in &items[..shown] {
        let _ = writeln!(out, "{item}");
    }
    let total = count_bullets(text);
    if shown < total {
        let _ = writeln!(out, "   ...and {} more items", total - shown);
    }
    out
}
