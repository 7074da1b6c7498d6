//! WebSocket client implementation.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

use crate::data::{group_by_theme, LoadError, QuestionSource, Selection};
use crate::models::ThemeBank;
use crate::protocol::{ClientMessage, ServerMessage};

/// How long a fetch may take, connection included.
pub const REPLY_TIMEOUT: Duration = Duration::from_secs(10);

/// Question source backed by a remote lookup service.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    host: String,
    port: u16,
    timeout: Duration,
}

impl RemoteSource {
    pub fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            timeout: REPLY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the server address string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Send one request on a fresh connection and wait for its reply.
    async fn request(&self, request_id: Uuid, exam: Option<String>) -> Result<ServerMessage, LoadError> {
        tokio::time::timeout(self.timeout, self.exchange(request_id, exam))
            .await
            .map_err(|_| {
                LoadError::transport(format!(
                    "no reply from {} within {:?}",
                    self.server_addr(),
                    self.timeout
                ))
            })?
    }

    async fn exchange(&self, request_id: Uuid, exam: Option<String>) -> Result<ServerMessage, LoadError> {
        let url = format!("ws://{}", self.server_addr());
        let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
            .await
            .map_err(|e| LoadError::transport(format!("failed to connect to {}: {}", url, e)))?;

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        let json = serde_json::to_string(&ClientMessage::FetchQuestions { request_id, exam })
            .map_err(LoadError::transport)?;
        ws_sender
            .send(Message::Text(json.into()))
            .await
            .map_err(LoadError::transport)?;

        while let Some(msg) = ws_receiver.next().await {
            let text = match msg {
                Ok(Message::Text(text)) => text.to_string(),
                Ok(Message::Close(_)) => break,
                Err(e) => return Err(LoadError::transport(e)),
                _ => continue,
            };

            let server_msg: ServerMessage = serde_json::from_str(&text)
                .map_err(|e| LoadError::transport(format!("unreadable reply: {}", e)))?;

            if server_msg.request_id() != request_id {
                log::debug!("Skipping reply to another request {}", server_msg.request_id());
                continue;
            }

            let _ = ws_sender.send(Message::Close(None)).await;
            return Ok(server_msg);
        }

        Err(LoadError::transport("connection closed before a reply arrived"))
    }
}

#[async_trait]
impl QuestionSource for RemoteSource {
    async fn fetch(&self, selection: &Selection) -> Result<ThemeBank, LoadError> {
        let request_id = Uuid::new_v4();
        let exam = selection.exam_key().map(ToString::to_string);

        match self.request(request_id, exam).await? {
            ServerMessage::ThemeBank { bank, .. } => Ok(bank),
            ServerMessage::ExamQuestions { questions, .. } => Ok(group_by_theme(questions)),
            ServerMessage::Failed { error, .. } => Err(error),
        }
    }
}
