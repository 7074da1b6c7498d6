//! # exam-quiz
//!
//! Terminal practice quiz for the 정보처리산업기사 written exam.
//!
//! Questions come from exam files (`<data>/<sitting>.json`), either read
//! locally or fetched from a lookup service started with `exam-quiz serve`.
//! A session runs in one of two modes:
//!
//! * random: up to 20 shuffled questions per subject, drawn from every sitting;
//! * fixed exam: every question of one sitting, in file order.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use exam_quiz::config::{PlayConfig, SourceConfig};
//! use exam_quiz::data::{Selection, QUESTIONS_PER_THEME};
//!
//! # async fn demo() -> Result<(), exam_quiz::QuizError> {
//! let config = PlayConfig {
//!     selection: Selection::Random,
//!     source: SourceConfig::Local {
//!         data_dir: "data".into(),
//!         per_theme: QUESTIONS_PER_THEME,
//!     },
//!     scoring: None,
//! };
//! exam_quiz::play(config).await?;
//! # Ok(())
//! # }
//! ```

mod app;
pub mod client;
pub mod config;
pub mod data;
pub mod models;
pub mod protocol;
pub mod server;
pub mod session;
pub mod terminal;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use thiserror::Error;
use tokio::sync::Mutex;

pub use app::{App, Toast, TOAST_DURATION};
pub use data::{LoadError, QuestionSource, Selection};
pub use models::{Question, Theme, ThemeBank};
pub use session::{Phase, QuizController, ScoreReport, SessionState};

use config::PlayConfig;
use session::RequestId;
use terminal::TerminalGuard;

/// Error type for quiz operations.
#[derive(Debug, Error)]
pub enum QuizError {
    /// Command line or environment settings are unusable.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// IO error while serving or drawing.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

type SharedApp = Arc<Mutex<App>>;

/// What the event loop does after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    None,
    Quit,
    Reload(RequestId),
}

/// Run a quiz in the terminal until the user quits.
pub async fn play(config: PlayConfig) -> Result<(), QuizError> {
    let source: Arc<dyn QuestionSource> = Arc::from(config.source.clone().into_source());
    let (app, request) = App::new(config.selection, config.scoring, config.source.describe());
    let app: SharedApp = Arc::new(Mutex::new(app));

    spawn_load(&app, &source, request).await;

    let mut terminal = TerminalGuard::enter()?;
    run_event_loop(&mut terminal, &app, &source).await
}

/// Fetch the bank for the app's selection in the background.
async fn spawn_load(app: &SharedApp, source: &Arc<dyn QuestionSource>, request: RequestId) {
    let selection = app.lock().await.selection().clone();
    let app = Arc::clone(app);
    let source = Arc::clone(source);

    tokio::spawn(async move {
        let result = source.fetch(&selection).await;
        app.lock().await.finish_load(request, result);
    });
}

async fn run_event_loop(
    terminal: &mut TerminalGuard,
    app: &SharedApp,
    source: &Arc<dyn QuestionSource>,
) -> Result<(), QuizError> {
    loop {
        {
            let mut app = app.lock().await;
            app.expire_toast(Instant::now());
            if app.should_quit {
                break;
            }
            terminal.draw(|frame| ui::render(frame, &app))?;
        }

        // Poll with a timeout so background loads and toasts show up.
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                let action = handle_input(&mut *app.lock().await, key.code);
                match action {
                    Action::None => {}
                    Action::Quit => break,
                    Action::Reload(request) => spawn_load(app, source, request).await,
                }
            }
        }
    }

    Ok(())
}

fn handle_input(app: &mut App, key: KeyCode) -> Action {
    if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc) {
        app.should_quit = true;
        return Action::Quit;
    }

    match app.phase() {
        Phase::Loading | Phase::LoadFailed | Phase::NothingToShow => handle_retry_input(app, key),
        Phase::InProgress => handle_quiz_input(app, key),
        Phase::Complete => handle_result_input(app, key),
    }
}

fn handle_retry_input(app: &mut App, key: KeyCode) -> Action {
    match key {
        KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Enter => Action::Reload(app.restart()),
        _ => Action::None,
    }
}

fn handle_quiz_input(app: &mut App, key: KeyCode) -> Action {
    match key {
        KeyCode::Char(c) if c.is_ascii_digit() => {
            if let Some(choice) = c.to_digit(10) {
                app.highlight(choice as usize);
            }
        }
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_option(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next_option(),
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(Err(e)) = app.submit_highlighted() {
                log::debug!("Submission ignored: {}", e);
            }
        }
        _ => {}
    }
    Action::None
}

fn handle_result_input(app: &mut App, key: KeyCode) -> Action {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_results_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_results_up(),
        KeyCode::Char('r') | KeyCode::Char('R') => return Action::Reload(app.restart()),
        _ => {}
    }
    Action::None
}
