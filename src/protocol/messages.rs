//! Protocol messages between the quiz client and the question lookup service.
//!
//! All messages are serialized as JSON over WebSocket. Every request carries
//! an id that the response echoes back.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::data::LoadError;
use crate::models::{Question, ThemeBank};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Ask for a random bank (`exam: None`) or for one exam sitting.
    FetchQuestions {
        request_id: Uuid,
        exam: Option<String>,
    },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Random sample, already grouped and capped per theme.
    ThemeBank { request_id: Uuid, bank: ThemeBank },

    /// Every question of one exam, flat and in file order.
    ExamQuestions {
        request_id: Uuid,
        exam: String,
        questions: Vec<Question>,
    },

    /// The request could not be served.
    Failed {
        request_id: Uuid,
        status: u16,
        error: LoadError,
    },
}

impl ServerMessage {
    pub fn failed(request_id: Uuid, error: LoadError) -> Self {
        Self::Failed {
            request_id,
            status: error.status(),
            error,
        }
    }

    pub fn request_id(&self) -> Uuid {
        match self {
            Self::ThemeBank { request_id, .. }
            | Self::ExamQuestions { request_id, .. }
            | Self::Failed { request_id, .. } => *request_id,
        }
    }
}

/// Default server port.
pub const DEFAULT_PORT: u16 = 8712;
