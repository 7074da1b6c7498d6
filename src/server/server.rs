//! WebSocket server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

use crate::config::ServeConfig;
use crate::data::{ExamKey, ExamLibrary, LoadError};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::QuizError;

/// Answers question requests from an [`ExamLibrary`].
#[derive(Debug, Clone)]
pub struct LookupService {
    library: ExamLibrary,
    per_theme: usize,
}

impl LookupService {
    pub fn new(library: ExamLibrary, per_theme: usize) -> Self {
        Self { library, per_theme }
    }

    pub fn library(&self) -> &ExamLibrary {
        &self.library
    }

    /// Builds the single reply to `msg`.
    pub async fn respond(&self, msg: ClientMessage) -> ServerMessage {
        match msg {
            ClientMessage::FetchQuestions {
                request_id,
                exam: None,
            } => match self.library.random_bank(self.per_theme).await {
                Ok(bank) => {
                    log::info!(
                        "Request {}: served random bank of {} questions",
                        request_id,
                        bank.total_questions()
                    );
                    ServerMessage::ThemeBank { request_id, bank }
                }
                Err(error) => reject(request_id, error),
            },
            ClientMessage::FetchQuestions {
                request_id,
                exam: Some(raw),
            } => match self.exam_questions(&raw).await {
                Ok((key, questions)) => {
                    log::info!(
                        "Request {}: served {} questions of exam {}",
                        request_id,
                        questions.len(),
                        key
                    );
                    ServerMessage::ExamQuestions {
                        request_id,
                        exam: key.to_string(),
                        questions,
                    }
                }
                Err(error) => reject(request_id, error),
            },
        }
    }

    async fn exam_questions(
        &self,
        raw: &str,
    ) -> Result<(ExamKey, Vec<crate::models::Question>), LoadError> {
        let key = ExamKey::parse(raw)?;
        let questions = self.library.load_exam(&key).await?;
        Ok((key, questions))
    }
}

fn reject(request_id: Uuid, error: LoadError) -> ServerMessage {
    match error.status() {
        400 | 404 => log::info!("Request {}: {}", request_id, error),
        _ => log::error!("Request {}: {}", request_id, error),
    }
    ServerMessage::failed(request_id, error)
}

/// Run the lookup service until Ctrl-C.
pub async fn run(config: ServeConfig) -> Result<(), QuizError> {
    let service = Arc::new(LookupService::new(config.library(), config.per_theme));

    match service.library().exam_keys().await {
        Ok(keys) => log::info!(
            "Serving {} exam files from {}",
            keys.len(),
            config.data_dir.display()
        ),
        Err(e) => log::warn!("Exam data is not readable yet: {}", e),
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    log::info!("Server listening on {}", addr);

    tokio::select! {
        _ = serve(listener, service) => {}
        signal = tokio::signal::ctrl_c() => {
            signal?;
            log::info!("Shutting down");
        }
    }

    Ok(())
}

/// Accept connections on `listener` forever.
pub async fn serve(listener: TcpListener, service: Arc<LookupService>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                tokio::spawn(handle_connection(stream, addr, Arc::clone(&service)));
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Handle a single WebSocket connection: one reply per request, in order.
async fn handle_connection(stream: TcpStream, addr: SocketAddr, service: Arc<LookupService>) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            log::warn!("WebSocket handshake with {} failed: {}", addr, e);
            return;
        }
    };

    let connection_id = Uuid::new_v4();
    log::debug!("Connection {} opened from {}", connection_id, addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    while let Some(msg) = ws_receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Close(_)) => break,
            Err(e) => {
                log::debug!("Connection {} errored: {}", connection_id, e);
                break;
            }
            _ => continue,
        };

        let client_msg: ClientMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Ignoring malformed message from {}: {}", addr, e);
                continue;
            }
        };

        let reply = service.respond(client_msg).await;
        let json = match serde_json::to_string(&reply) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to encode reply: {}", e);
                continue;
            }
        };

        if ws_sender.send(Message::Text(json.into())).await.is_err() {
            break;
        }
    }

    log::debug!("Connection {} closed", connection_id);
}
