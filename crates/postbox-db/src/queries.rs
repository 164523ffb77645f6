use crate::Database;
use crate::models::{MessageFilter, MessageRow, RecipientRow};
use anyhow::Result;
use chrono::{Duration, Utc};
use rusqlite::Connection;

/// Messages older than this never appear in a listing.
const RETENTION_DAYS: i64 = 30;

/// SQLite's datetime('now') text form, also used for the cutoff parameter so
/// the age comparison stays a plain lexicographic one.
const SQLITE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl Database {
    /// Insert a message and its recipient rows in one transaction.
    /// `recipients` must be non-empty, sorted and deduplicated by the caller.
    /// Returns the assigned message id.
    pub fn insert_message(&self, sender: &str, body: &str, recipients: &[String]) -> Result<i64> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO messages (sender, body) VALUES (?1, ?2)",
                (sender, body),
            )?;
            let id = tx.last_insert_rowid();
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO message_recipients (message_id, recipient) VALUES (?1, ?2)",
                )?;
                for recipient in recipients {
                    stmt.execute((id, recipient))?;
                }
            }
            tx.commit()?;
            Ok(id)
        })
    }

    /// Messages addressed to `filter.recipient` within the retention window,
    /// oldest first. Recipient and sender matching is exact and
    /// case-sensitive.
    pub fn list_messages(&self, filter: &MessageFilter) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| query_messages(conn, filter))
    }

    /// Batch-fetch recipient rows for a set of message IDs, ordered by
    /// (message_id, recipient) so callers see each recipient list sorted.
    pub fn recipients_for_messages(&self, message_ids: &[i64]) -> Result<Vec<RecipientRow>> {
        if message_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> =
                (1..=message_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT message_id, recipient FROM message_recipients
                 WHERE message_id IN ({})
                 ORDER BY message_id, recipient",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> = message_ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(params.as_slice(), |row| {
                    Ok(RecipientRow {
                        message_id: row.get(0)?,
                        recipient: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_messages(conn: &Connection, filter: &MessageFilter) -> Result<Vec<MessageRow>> {
    let cutoff = (Utc::now() - Duration::days(RETENTION_DAYS))
        .format(SQLITE_DATETIME_FORMAT)
        .to_string();

    // The (message_id, recipient) primary key guarantees at most one join row
    // per message, so no DISTINCT is needed. LIMIT -1 is SQLite's "no limit".
    let mut stmt = conn.prepare(
        "SELECT m.id, m.sender, m.body
         FROM messages m
         JOIN message_recipients r ON r.message_id = m.id
         WHERE r.recipient = ?1
           AND m.created_at > ?2
           AND (?3 IS NULL OR m.sender = ?3)
         ORDER BY m.id
         LIMIT ?4",
    )?;

    let limit: i64 = filter.limit.map(i64::from).unwrap_or(-1);

    let rows = stmt
        .query_map(
            rusqlite::params![&filter.recipient, cutoff, filter.sender.as_deref(), limit],
            |row| {
                Ok(MessageRow {
                    id: row.get(0)?,
                    sender: row.get(1)?,
                    body: row.get(2)?,
                })
            },
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
