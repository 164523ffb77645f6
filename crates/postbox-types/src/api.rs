use serde::{Deserialize, Serialize};

// -- Messages --

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub message_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub sender: String,
    pub recipients: Vec<String>,
    pub text: String,
    pub message_id: i64,
}

/// The `recipients` field of a send request: clients may pass a bare string
/// for a single recipient or an array for group messages.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    /// Normalize to the stored form: a single string becomes a one-element
    /// list, arrays are sorted alphabetically and deduplicated.
    pub fn into_normalized(self) -> Vec<String> {
        match self {
            Recipients::One(name) => vec![name],
            Recipients::Many(mut names) => {
                names.sort();
                names.dedup();
                names
            }
        }
    }
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_message: String,
}
