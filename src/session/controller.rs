//! Session lifecycle: loading, playing, and the failure states around them.

use std::fmt;

use uuid::Uuid;

use crate::data::{LoadError, Selection};
use crate::models::ThemeBank;

use super::score::{ScoreReport, ScoringScheme};
use super::state::{Feedback, SessionPhase, SessionState, Submission, SubmitError};

/// Identifies one load request. Only the latest one may populate a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    InProgress,
    Complete,
    /// The bank could not be loaded. Not the same as finishing.
    LoadFailed,
    /// The bank loaded but holds no questions.
    NothingToShow,
}

#[derive(Debug, Clone)]
pub enum ControllerState {
    Loading { request: RequestId },
    Ready(SessionState),
    LoadFailed { error: LoadError },
    NothingToShow,
}

/// Drives one quiz from the load request to the score report.
#[derive(Debug, Clone)]
pub struct QuizController {
    selection: Selection,
    scoring: Option<ScoringScheme>,
    state: ControllerState,
}

impl QuizController {
    /// A controller waiting for the bank of `selection`. Pass the returned
    /// id to [`QuizController::finish_load`] once the fetch resolves.
    pub fn new(selection: Selection, scoring: Option<ScoringScheme>) -> (Self, RequestId) {
        let request = RequestId::new();
        let controller = Self {
            selection,
            scoring,
            state: ControllerState::Loading { request },
        };
        (controller, request)
    }

    /// Drops the current session and any pending load, then waits for a
    /// new bank. `None` keeps the current selection.
    pub fn restart(&mut self, selection: Option<Selection>) -> RequestId {
        if let Some(selection) = selection {
            self.selection = selection;
        }
        let request = RequestId::new();
        self.state = ControllerState::Loading { request };
        log::debug!("Requested question bank for {} ({})", self.selection, request);
        request
    }

    /// Applies the outcome of `request`. Results of superseded requests are
    /// dropped; returns whether this one was applied.
    pub fn finish_load(&mut self, request: RequestId, result: Result<ThemeBank, LoadError>) -> bool {
        if self.pending_request() != Some(request) {
            log::debug!("Discarding stale load result {}", request);
            return false;
        }

        self.state = match result {
            Ok(bank) => {
                let scheme = self
                    .scoring
                    .unwrap_or_else(|| ScoringScheme::for_bank(&bank));
                match SessionState::start(bank, scheme) {
                    Some(session) => ControllerState::Ready(session),
                    None => ControllerState::NothingToShow,
                }
            }
            Err(error) => {
                log::warn!("Could not load questions for {}: {}", self.selection, error);
                ControllerState::LoadFailed { error }
            }
        };
        true
    }

    pub fn pending_request(&self) -> Option<RequestId> {
        match self.state {
            ControllerState::Loading { request } => Some(request),
            _ => None,
        }
    }

    pub fn phase(&self) -> Phase {
        match &self.state {
            ControllerState::Loading { .. } => Phase::Loading,
            ControllerState::Ready(session) => match session.phase() {
                SessionPhase::InProgress => Phase::InProgress,
                SessionPhase::Complete => Phase::Complete,
            },
            ControllerState::LoadFailed { .. } => Phase::LoadFailed,
            ControllerState::NothingToShow => Phase::NothingToShow,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Scheme of the running session, else the configured override.
    /// `None` until a bank has arrived when nothing was configured.
    pub fn scheme(&self) -> Option<ScoringScheme> {
        self.session().map(SessionState::scheme).or(self.scoring)
    }

    pub fn session(&self) -> Option<&SessionState> {
        match &self.state {
            ControllerState::Ready(session) => Some(session),
            _ => None,
        }
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        match &self.state {
            ControllerState::LoadFailed { error } => Some(error),
            _ => None,
        }
    }

    /// Answers the question at `position` with the 1-based `choice`.
    pub fn submit(&mut self, position: usize, choice: usize) -> Result<Feedback, SubmitError> {
        self.apply(Submission::new(position, choice))
    }

    pub fn apply(&mut self, submission: Submission) -> Result<Feedback, SubmitError> {
        let ControllerState::Ready(session) = &self.state else {
            return Err(SubmitError::NotInProgress);
        };

        let (next, feedback) = session.submit(submission)?;
        if feedback.finished {
            log::info!("Quiz complete after {} answers", next.history().len());
        }
        self.state = ControllerState::Ready(next);
        Ok(feedback)
    }

    /// Score report, once a session exists.
    pub fn report(&self) -> Option<ScoreReport> {
        self.session().map(SessionState::report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ExamKey;
    use crate::models::{Question, Theme};

    fn one_question_bank() -> ThemeBank {
        let mut bank = ThemeBank::new();
        bank.push(Question {
            text: "Q".to_string(),
            choices: vec!["a".into(), "b".into()],
            correct_choice: 2,
            theme: Theme::new(1),
            source_exam: "2022-1".to_string(),
            explanation: None,
        });
        bank
    }

    fn exam_selection() -> Selection {
        Selection::Exam(ExamKey::parse("2022-1").unwrap())
    }

    #[test]
    fn test_starts_loading() {
        let (controller, request) = QuizController::new(Selection::Random, None);
        assert_eq!(controller.phase(), Phase::Loading);
        assert_eq!(controller.pending_request(), Some(request));
        assert_eq!(
            controller.clone().submit(0, 1).unwrap_err(),
            SubmitError::NotInProgress
        );
    }

    #[test]
    fn test_load_then_play() {
        let (mut controller, request) = QuizController::new(exam_selection(), None);
        assert!(controller.finish_load(request, Ok(one_question_bank())));
        assert_eq!(controller.phase(), Phase::InProgress);
        assert_eq!(controller.scheme(), Some(ScoringScheme::Percentage));

        let feedback = controller.submit(0, 2).unwrap();
        assert!(feedback.is_correct && feedback.finished);
        assert_eq!(controller.phase(), Phase::Complete);
        assert_eq!(controller.report().unwrap().average, 100);

        assert_eq!(controller.submit(1, 2).unwrap_err(), SubmitError::Complete);
        assert_eq!(controller.session().unwrap().history().len(), 1);
    }

    #[test]
    fn test_load_failure_is_not_complete() {
        let (mut controller, request) = QuizController::new(exam_selection(), None);
        let error = LoadError::NotFound {
            key: "2022-1".to_string(),
        };
        controller.finish_load(request, Err(error.clone()));

        assert_eq!(controller.phase(), Phase::LoadFailed);
        assert_eq!(controller.load_error(), Some(&error));
        assert!(controller.session().is_none());
        assert!(controller.report().is_none());
    }

    #[test]
    fn test_empty_bank_is_nothing_to_show() {
        let (mut controller, request) = QuizController::new(Selection::Random, None);
        let mut bank = ThemeBank::new();
        for theme in Theme::KNOWN {
            bank.add_theme(theme);
        }
        controller.finish_load(request, Ok(bank));
        assert_eq!(controller.phase(), Phase::NothingToShow);
    }

    #[test]
    fn test_last_request_wins() {
        let (mut controller, first) = QuizController::new(Selection::Random, None);
        let second = controller.restart(Some(exam_selection()));

        assert!(!controller.finish_load(first, Ok(one_question_bank())));
        assert_eq!(controller.phase(), Phase::Loading);

        assert!(controller.finish_load(second, Ok(one_question_bank())));
        assert_eq!(controller.phase(), Phase::InProgress);
        assert_eq!(controller.selection(), &exam_selection());

        assert!(!controller.finish_load(second, Err(LoadError::Server {
            detail: "late".to_string()
        })));
        assert_eq!(controller.phase(), Phase::InProgress);
    }

    #[test]
    fn test_restart_discards_session() {
        let (mut controller, request) = QuizController::new(exam_selection(), None);
        controller.finish_load(request, Ok(one_question_bank()));
        controller.submit(0, 1).unwrap();

        let request = controller.restart(None);
        assert!(controller.session().is_none());
        controller.finish_load(request, Ok(one_question_bank()));
        assert!(controller.session().unwrap().history().is_empty());
    }

    #[test]
    fn test_scoring_override() {
        let (mut controller, request) =
            QuizController::new(Selection::Random, Some(ScoringScheme::FIXED_FIVE));
        assert_eq!(controller.scheme(), Some(ScoringScheme::FIXED_FIVE));

        controller.finish_load(request, Ok(one_question_bank()));
        assert_eq!(controller.scheme(), Some(ScoringScheme::FIXED_FIVE));
        controller.submit(0, 2).unwrap();
        assert_eq!(controller.report().unwrap().average, 5);
    }

    #[test]
    fn test_short_random_bank_scored_in_percent() {
        let (mut controller, request) = QuizController::new(Selection::Random, None);
        assert_eq!(controller.scheme(), None);

        let mut bank = one_question_bank();
        let template = bank.get(Theme::new(1))[0].clone();
        for theme in [2, 3] {
            bank.push(Question {
                theme: Theme::new(theme),
                ..template.clone()
            });
        }
        controller.finish_load(request, Ok(bank));
        assert_eq!(controller.scheme(), Some(ScoringScheme::Percentage));

        for position in 0..3 {
            controller.submit(position, 2).unwrap();
        }
        let report = controller.report().unwrap();
        assert_eq!(report.average, 100);
        assert!(report.passed);
    }
}
