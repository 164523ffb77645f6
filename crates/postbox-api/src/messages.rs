use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header},
    response::IntoResponse,
};
use serde_json::Value;
use tracing::info;

use postbox_db::models::MessageFilter;
use postbox_types::api::{MessageResponse, Recipients, SendMessageResponse};

use crate::AppStateInner;
use crate::error::ApiError;

const REQUIRED_SEND_FIELDS: [&str; 3] = ["recipients", "sender", "text"];
const DEFAULT_LIMIT: u32 = 100;

/// POST /messages — store a message from one sender to one or more recipients.
pub async fn send_message(
    State(state): State<Arc<AppStateInner>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let payload = require_json(&headers, &body)?;

    let mut missing: Vec<String> = REQUIRED_SEND_FIELDS
        .iter()
        .filter(|field| payload.get(**field).is_none())
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(ApiError::MissingFields(missing));
    }

    let sender = string_field(&payload, "sender")?;
    let text = string_field(&payload, "text")?;

    // A bare string is a single recipient; an array is a group message.
    let recipients: Recipients = serde_json::from_value(payload["recipients"].clone())
        .map_err(|_| ApiError::InvalidField("recipients"))?;
    let recipients = recipients.into_normalized();
    if recipients.is_empty() {
        return Err(ApiError::InvalidField("recipients"));
    }

    // Run the blocking DB insert off the async runtime
    let db = state.clone();
    let recipient_count = recipients.len();
    let message_id =
        tokio::task::spawn_blocking(move || db.db.insert_message(&sender, &text, &recipients))
            .await
            .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    info!("Message {} stored for {} recipient(s)", message_id, recipient_count);

    Ok(Json(SendMessageResponse { message_id }))
}

/// GET /messages — list messages addressed to a recipient within the
/// 30-day window, oldest first.
pub async fn list_messages(
    State(state): State<Arc<AppStateInner>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let payload = require_json(&headers, &body)?;

    let recipient = match payload.get("recipient") {
        Some(value) => value
            .as_str()
            .ok_or(ApiError::InvalidField("recipient"))?
            .to_string(),
        None => return Err(ApiError::MissingRecipient),
    };

    // Presence of both keys is the error, whatever their values.
    if payload.get("limit").is_some() && payload.get("all").is_some() {
        return Err(ApiError::MutuallyExclusiveOptions);
    }

    let all = match payload.get("all") {
        Some(value) => value.as_bool().ok_or(ApiError::InvalidField("all"))?,
        None => false,
    };
    let limit = match payload.get("limit") {
        Some(value) => serde_json::from_value::<u32>(value.clone())
            .map_err(|_| ApiError::InvalidField("limit"))?,
        None => DEFAULT_LIMIT,
    };
    let sender = match payload.get("sender") {
        Some(value) => Some(
            value
                .as_str()
                .ok_or(ApiError::InvalidField("sender"))?
                .to_string(),
        ),
        None => None,
    };

    let filter = MessageFilter {
        recipient,
        sender,
        limit: if all { None } else { Some(limit) },
    };

    // Run all blocking DB queries off the async runtime
    let db = state.clone();
    let (rows, recipient_rows) = tokio::task::spawn_blocking(move || {
        let rows = db.db.list_messages(&filter)?;
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let recipient_rows = db.db.recipients_for_messages(&ids)?;
        Ok::<_, anyhow::Error>((rows, recipient_rows))
    })
    .await
    .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))??;

    // Group recipients by message id; rows arrive ordered by
    // (message_id, recipient), so each list is already alphabetical.
    let mut recipient_map: HashMap<i64, Vec<String>> = HashMap::new();
    for row in recipient_rows {
        recipient_map
            .entry(row.message_id)
            .or_default()
            .push(row.recipient);
    }

    let messages: Vec<MessageResponse> = rows
        .into_iter()
        .map(|row| MessageResponse {
            sender: row.sender,
            recipients: recipient_map.remove(&row.id).unwrap_or_default(),
            text: row.body,
            message_id: row.id,
        })
        .collect();

    Ok(Json(messages))
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Both endpoints require a JSON body. Parsing here instead of using the
/// framework extractor keeps rejection bodies in our own error shape.
fn require_json(headers: &HeaderMap, body: &Bytes) -> Result<Value, ApiError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|mime| mime.split(';').next().unwrap_or("").trim().ends_with("json"))
        .unwrap_or(false);

    if !is_json {
        return Err(ApiError::InvalidContentType);
    }

    serde_json::from_slice(body).map_err(|_| ApiError::InvalidContentType)
}

fn string_field(payload: &Value, field: &'static str) -> Result<String, ApiError> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ApiError::InvalidField(field))
}
