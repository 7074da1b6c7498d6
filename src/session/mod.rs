//! Quiz session controller.
//!
//! [`SessionState`] holds the answers and cursor of one quiz and scores it;
//! [`QuizController`] wraps it with the load lifecycle.

mod controller;
mod score;
mod state;

pub use controller::{ControllerState, Phase, QuizController, RequestId};
pub use score::{ScoreReport, ScoringScheme, ThemeScore, PASS_AVERAGE, SUBJECT_MINIMUM};
pub use state::{
    AnswerRecord, Cursor, Feedback, SessionPhase, SessionState, SubmitError, Submission,
};
