use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use exam_quiz::client::RemoteSource;
use exam_quiz::data::{ExamKey, ExamLibrary, LoadError, QuestionSource, Selection};
use exam_quiz::models::Theme;
use exam_quiz::protocol::{ClientMessage, ServerMessage};
use exam_quiz::server::{serve, LookupService};
use serde_json::json;
use tokio::net::TcpListener;
use uuid::Uuid;

fn data_dir() -> PathBuf {
    let path = std::env::temp_dir().join(format!("exam-quiz-server-{}", Uuid::new_v4()));
    fs::create_dir_all(&path).unwrap();

    let questions = json!([
        { "question": "a", "answers": ["x", "y"], "correct": 1, "theme": 1 },
        { "question": "b", "answers": ["x", "y"], "correct": 2, "theme": 2 },
        { "question": "c", "answers": ["x", "y"], "correct": 1, "theme": 3 },
        { "question": "d", "answers": ["x", "y"], "correct": 2, "theme": 3 },
    ]);
    fs::write(path.join("2022-1.json"), questions.to_string()).unwrap();
    path
}

/// Starts a lookup service on a free local port.
async fn start_service(data: &Path) -> RemoteSource {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let service = Arc::new(LookupService::new(ExamLibrary::new(data), 20));
    tokio::spawn(serve(listener, service));
    RemoteSource::new("127.0.0.1".to_string(), port)
}

#[tokio::test]
async fn test_remote_exam_fetch() {
    let data = data_dir();
    let source = start_service(&data).await;

    let bank = source
        .fetch(&Selection::Exam(ExamKey::parse("2022-1").unwrap()))
        .await
        .unwrap();

    assert_eq!(bank.total_questions(), 4);
    let third: Vec<&str> = bank.get(Theme::new(3)).iter().map(|q| q.text.as_str()).collect();
    assert_eq!(third, vec!["c", "d"]);
    assert!(bank.get(Theme::new(1)).iter().all(|q| q.source_exam == "2022-1"));

    let _ = fs::remove_dir_all(&data);
}

#[tokio::test]
async fn test_remote_missing_exam_is_not_found() {
    let data = data_dir();
    let source = start_service(&data).await;

    let result = source
        .fetch(&Selection::Exam(ExamKey::parse("9999-9").unwrap()))
        .await;
    assert_eq!(
        result,
        Err(LoadError::NotFound {
            key: "9999-9".to_string()
        })
    );

    let _ = fs::remove_dir_all(&data);
}

#[tokio::test]
async fn test_remote_random_bank() {
    let data = data_dir();
    let source = start_service(&data).await;

    let bank = source.fetch(&Selection::Random).await.unwrap();
    assert_eq!(bank.themes().collect::<Vec<_>>(), Theme::KNOWN.to_vec());
    assert_eq!(bank.get(Theme::new(3)).len(), 2);

    let _ = fs::remove_dir_all(&data);
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let source = RemoteSource::new("127.0.0.1".to_string(), port);
    let result = source.fetch(&Selection::Random).await;
    assert!(matches!(result, Err(LoadError::Transport { .. })));
}

#[tokio::test]
async fn test_bad_key_rejected_at_boundary() {
    let data = data_dir();
    let service = LookupService::new(ExamLibrary::new(&data), 20);
    let request_id = Uuid::new_v4();

    let reply = service
        .respond(ClientMessage::FetchQuestions {
            request_id,
            exam: Some("../secrets".to_string()),
        })
        .await;

    match reply {
        ServerMessage::Failed {
            request_id: id,
            status,
            error,
        } => {
            assert_eq!(id, request_id);
            assert_eq!(status, 400);
            assert!(matches!(error, LoadError::BadRequest { .. }));
        }
        other => panic!("expected a failure, got {:?}", other),
    }

    let _ = fs::remove_dir_all(&data);
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let _ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let source = RemoteSource::new("127.0.0.1".to_string(), port)
        .with_timeout(Duration::from_millis(200));
    let result = source.fetch(&Selection::Random).await;
    assert!(matches!(result, Err(LoadError::Transport { .. })));
}
