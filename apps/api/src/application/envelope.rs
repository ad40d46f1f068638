use serde::{Deserialize, Serialize};

use crate::application::messages;
use crate::application::validation::FieldError;

/// The JSON body every submission response carries, on success and on failure.
/// The client side deserializes the same type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub message: EnvelopeMessage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

/// A single message, or the list of per-field messages on validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvelopeMessage {
    Text(String),
    List(Vec<String>),
}

impl EnvelopeMessage {
    /// Flattens to one line, the way a banner shows it.
    pub fn joined(&self) -> String {
        match self {
            EnvelopeMessage::Text(text) => text.clone(),
            EnvelopeMessage::List(items) => items.join("; "),
        }
    }
}

impl Envelope {
    pub fn accepted(id: i64) -> Self {
        Self {
            success: true,
            kind: None,
            message: EnvelopeMessage::Text(messages::SUBMISSION_SAVED.to_string()),
            id: Some(id),
        }
    }

    pub fn invalid(errors: &[FieldError]) -> Self {
        Self {
            success: false,
            kind: Some(messages::VALIDATION_ERROR_TYPE.to_string()),
            message: EnvelopeMessage::List(errors.iter().map(FieldError::message).collect()),
            id: None,
        }
    }

    pub fn failure(message: &str) -> Self {
        Self {
            success: false,
            kind: None,
            message: EnvelopeMessage::Text(message.to_string()),
            id: None,
        }
    }
}
