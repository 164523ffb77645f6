/// Database row types — these map directly to SQLite rows.
/// Distinct from the postbox-types wire models to keep the DB layer independent.

pub struct MessageRow {
    pub id: i64,
    pub sender: String,
    pub body: String,
}

pub struct RecipientRow {
    pub message_id: i64,
    pub recipient: String,
}

/// Filter for a message listing. `limit: None` means unbounded.
pub struct MessageFilter {
    pub recipient: String,
    pub sender: Option<String>,
    pub limit: Option<u32>,
}
