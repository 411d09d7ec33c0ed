pub const UNKNOWN_USER: &str = "(unknown)";

/// Per-user message count for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestEntry {
    pub user_name: Option<String>,
    pub message_count: i64,
}

impl DigestEntry {
    pub fn display_name(&self) -> &str {
        self.user_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_USER)
    }
}
