use std::time::{Duration, Instant};

use crate::data::{LoadError, Selection};
use crate::models::{Question, ThemeBank};
use crate::session::{
    Feedback, Phase, QuizController, RequestId, ScoringScheme, SessionState, SubmitError,
};

/// How long the correctness toast stays on screen.
pub const TOAST_DURATION: Duration = Duration::from_millis(1000);

/// Transient notice shown after each answer.
#[derive(Debug, Clone)]
pub struct Toast {
    pub feedback: Feedback,
    pub shown_at: Instant,
}

/// Terminal quiz state: the controller plus what only the screen needs.
pub struct App {
    controller: QuizController,
    source_label: String,
    /// 1-based choice under the keyboard highlight.
    highlighted: Option<usize>,
    result_scroll: usize,
    toast: Option<Toast>,
    pub should_quit: bool,
}

impl App {
    /// Returns the app in its loading state and the id of the load to run.
    pub fn new(
        selection: Selection,
        scoring: Option<ScoringScheme>,
        source_label: String,
    ) -> (Self, RequestId) {
        let (controller, request) = QuizController::new(selection, scoring);
        let app = Self {
            controller,
            source_label,
            highlighted: None,
            result_scroll: 0,
            toast: None,
            should_quit: false,
        };
        (app, request)
    }

    pub fn controller(&self) -> &QuizController {
        &self.controller
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    pub fn selection(&self) -> &Selection {
        self.controller.selection()
    }

    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.controller.session()
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        self.controller.load_error()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session().and_then(SessionState::current_question)
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn result_scroll(&self) -> usize {
        self.result_scroll
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    /// Applies a finished load. Returns false when it was superseded.
    pub fn finish_load(&mut self, request: RequestId, result: Result<ThemeBank, LoadError>) -> bool {
        self.controller.finish_load(request, result)
    }

    /// Throws the session away and asks for a new bank.
    pub fn restart(&mut self) -> RequestId {
        self.highlighted = None;
        self.result_scroll = 0;
        self.toast = None;
        self.controller.restart(None)
    }

    fn choice_count(&self) -> usize {
        self.current_question()
            .map(|question| question.choices.len())
            .unwrap_or(0)
    }

    /// Highlights the 1-based `choice` if the current question has it.
    pub fn highlight(&mut self, choice: usize) {
        if (1..=self.choice_count()).contains(&choice) {
            self.highlighted = Some(choice);
        }
    }

    pub fn select_next_option(&mut self) {
        let count = self.choice_count();
        if count == 0 {
            return;
        }
        self.highlighted = Some(match self.highlighted {
            Some(choice) => choice % count + 1,
            None => 1,
        });
    }

    pub fn select_previous_option(&mut self) {
        let count = self.choice_count();
        if count == 0 {
            return;
        }
        self.highlighted = Some(match self.highlighted {
            Some(choice) if choice > 1 => choice - 1,
            _ => count,
        });
    }

    /// Submits the highlighted choice for the current question.
    ///
    /// Nothing happens without a highlight. The position check inside the
    /// controller keeps a repeated key press from answering twice.
    pub fn submit_highlighted(&mut self) -> Option<Result<Feedback, SubmitError>> {
        let choice = self.highlighted?;
        let position = self.session()?.position();
        Some(self.submit(position, choice))
    }

    pub fn submit(&mut self, position: usize, choice: usize) -> Result<Feedback, SubmitError> {
        let feedback = self.controller.submit(position, choice)?;
        self.highlighted = None;
        self.toast = Some(Toast {
            feedback: feedback.clone(),
            shown_at: Instant::now(),
        });
        Ok(feedback)
    }

    /// Drops the toast once it has been visible long enough.
    pub fn expire_toast(&mut self, now: Instant) {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| now.duration_since(toast.shown_at) >= TOAST_DURATION)
        {
            self.toast = None;
        }
    }

    pub fn scroll_results_down(&mut self) {
        let max_scroll = self
            .session()
            .map(|session| session.history().len() * 6)
            .unwrap_or(0);
        self.result_scroll = (self.result_scroll + 1).min(max_scroll);
    }

    pub fn scroll_results_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ExamKey;
    use crate::models::Theme;

    fn loaded_app() -> App {
        let mut bank = ThemeBank::new();
        for (text, theme) in [("a", 1), ("b", 2)] {
            bank.push(Question {
                text: text.to_string(),
                choices: vec!["1".into(), "2".into(), "3".into()],
                correct_choice: 2,
                theme: Theme::new(theme),
                source_exam: "2022-1".to_string(),
                explanation: None,
            });
        }
        let selection = Selection::Exam(ExamKey::parse("2022-1").unwrap());
        let (mut app, request) = App::new(selection, None, "data".to_string());
        assert!(app.finish_load(request, Ok(bank)));
        app
    }

    #[test]
    fn test_highlight_wraps() {
        let mut app = loaded_app();
        app.select_previous_option();
        assert_eq!(app.highlighted(), Some(3));
        app.select_next_option();
        assert_eq!(app.highlighted(), Some(1));
        app.highlight(9);
        assert_eq!(app.highlighted(), Some(1));
        app.highlight(2);
        assert_eq!(app.highlighted(), Some(2));
    }

    #[test]
    fn test_submit_needs_highlight() {
        let mut app = loaded_app();
        assert!(app.submit_highlighted().is_none());

        app.highlight(2);
        let feedback = app.submit_highlighted().unwrap().unwrap();
        assert!(feedback.is_correct);
        assert_eq!(app.highlighted(), None);
        assert!(app.toast().is_some());
        assert_eq!(app.session().unwrap().history().len(), 1);
    }

    #[test]
    fn test_double_submit_records_once() {
        let mut app = loaded_app();
        let position = app.session().unwrap().position();
        app.submit(position, 1).unwrap();
        assert!(matches!(
            app.submit(position, 1),
            Err(SubmitError::Stale { .. })
        ));
        assert_eq!(app.session().unwrap().history().len(), 1);
    }

    #[test]
    fn test_toast_expires() {
        let mut app = loaded_app();
        app.submit(0, 1).unwrap();
        let shown_at = app.toast().unwrap().shown_at;

        app.expire_toast(shown_at + Duration::from_millis(500));
        assert!(app.toast().is_some());
        app.expire_toast(shown_at + TOAST_DURATION);
        assert!(app.toast().is_none());
    }

    #[test]
    fn test_restart_goes_back_to_loading() {
        let mut app = loaded_app();
        app.submit(0, 2).unwrap();
        let request = app.restart();

        assert_eq!(app.phase(), Phase::Loading);
        assert!(app.toast().is_none());
        assert_eq!(app.controller().pending_request(), Some(request));
    }
}
