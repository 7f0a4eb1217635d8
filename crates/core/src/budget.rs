//! Best-effort budget extraction from free-form Spanish request text.
//!
//! Families often mention how they will pay ("tengo $80", "pagaré con
//! 100", "50 dólares"). The first recognised amount becomes the request's
//! budget label. A miss simply leaves the budget empty.

use std::sync::LazyLock;

use regex::Regex;

/// Patterns tried in order; the first match wins.
static BUDGET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\$\s?\d+",
        r"(?i)tengo\s+\$?\d+",
        r"(?i)pagar[eé]\s+con\s+\$?\d+",
        r"(?i)\d+\s+d[oó]lares",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Extract a normalised budget label such as `"$100 cash"`.
pub fn extract_budget(text: &str) -> Option<String> {
    BUDGET_PATTERNS.iter().find_map(|pattern| {
        let matched = pattern.find(text)?;
        let amount = AMOUNT_RE.find(matched.as_str())?;
        Some(format!("${} cash", amount.as_str()))
    })
}
