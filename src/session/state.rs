//! Quiz-in-progress state and its transition function.
//!
//! [`SessionState`] is a plain value: [`SessionState::submit`] returns the
//! next state instead of mutating the current one, so callers decide when a
//! transition is committed.

use std::sync::Arc;

use thiserror::Error;

use crate::models::{Question, Theme, ThemeBank};

use super::score::{ScoreReport, ScoringScheme};

/// One recorded response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question: Question,
    /// 1-based choice, `None` when the question went unanswered.
    pub selected: Option<usize>,
    pub is_correct: bool,
}

impl AnswerRecord {
    pub fn new(question: Question, selected: Option<usize>) -> Self {
        let is_correct = question.is_correct(selected);
        Self {
            question,
            selected,
            is_correct,
        }
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.selected
            .and_then(|choice| self.question.choice_text(choice))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    InProgress,
    Complete,
}

/// Position of the next question to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub theme_index: usize,
    pub question_index: usize,
}

/// An answer for the question at overall `position` (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub position: usize,
    pub choice: Option<usize>,
}

impl Submission {
    pub fn new(position: usize, choice: usize) -> Self {
        Self {
            position,
            choice: Some(choice),
        }
    }

    pub fn unanswered(position: usize) -> Self {
        Self {
            position,
            choice: None,
        }
    }
}

/// Correctness notice emitted by each accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub is_correct: bool,
    pub correct_choice: usize,
    /// Empty when the stored correct choice does not exist.
    pub correct_text: String,
    /// The submission answered the last question.
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("no quiz is in progress")]
    NotInProgress,
    #[error("the quiz is already complete")]
    Complete,
    #[error("answer for question {got} arrived, but question {expected} is current")]
    Stale { expected: usize, got: usize },
    #[error("choice {choice} does not exist (question has {choices} choices)")]
    ChoiceOutOfRange { choice: usize, choices: usize },
    #[error("cursor {0:?} points outside the question bank")]
    CursorOutOfBank(Cursor),
}

#[derive(Debug, Clone)]
pub struct SessionState {
    bank: Arc<ThemeBank>,
    ordered_themes: Vec<Theme>,
    cursor: Option<Cursor>,
    history: Vec<AnswerRecord>,
    scheme: ScoringScheme,
}

impl SessionState {
    /// Starts at the first question of the lowest theme. Themes without
    /// questions are skipped; `None` if no theme has any.
    pub fn start(bank: ThemeBank, scheme: ScoringScheme) -> Option<Self> {
        let ordered_themes = bank.themes_with_questions();
        if ordered_themes.is_empty() {
            return None;
        }

        Some(Self {
            bank: Arc::new(bank),
            ordered_themes,
            cursor: Some(Cursor {
                theme_index: 0,
                question_index: 0,
            }),
            history: Vec::new(),
            scheme,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        if self.cursor.is_some() {
            SessionPhase::InProgress
        } else {
            SessionPhase::Complete
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase() == SessionPhase::Complete
    }

    pub fn bank(&self) -> &ThemeBank {
        &self.bank
    }

    pub fn ordered_themes(&self) -> &[Theme] {
        &self.ordered_themes
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    pub fn history(&self) -> &[AnswerRecord] {
        &self.history
    }

    pub fn scheme(&self) -> ScoringScheme {
        self.scheme
    }

    pub fn current_theme(&self) -> Option<Theme> {
        let cursor = self.cursor?;
        self.ordered_themes.get(cursor.theme_index).copied()
    }

    pub fn current_question(&self) -> Option<&Question> {
        let cursor = self.cursor?;
        let theme = self.ordered_themes.get(cursor.theme_index)?;
        self.bank.get(*theme).get(cursor.question_index)
    }

    /// 0-based overall position of the current question.
    pub fn position(&self) -> usize {
        self.history.len()
    }

    /// 1-based running number shown to the user.
    pub fn question_number(&self) -> usize {
        self.history.len() + 1
    }

    pub fn total_questions(&self) -> usize {
        self.bank.total_questions()
    }

    /// Records `submission` against the current question and advances.
    pub fn submit(&self, submission: Submission) -> Result<(SessionState, Feedback), SubmitError> {
        let cursor = self.cursor.ok_or(SubmitError::Complete)?;
        if submission.position != self.position() {
            return Err(SubmitError::Stale {
                expected: self.position(),
                got: submission.position,
            });
        }

        let theme = *self
            .ordered_themes
            .get(cursor.theme_index)
            .ok_or(SubmitError::CursorOutOfBank(cursor))?;
        let questions = self.bank.get(theme);
        let question = questions
            .get(cursor.question_index)
            .ok_or(SubmitError::CursorOutOfBank(cursor))?;

        if let Some(choice) = submission.choice {
            if choice == 0 || choice > question.choices.len() {
                return Err(SubmitError::ChoiceOutOfRange {
                    choice,
                    choices: question.choices.len(),
                });
            }
        }

        let record = AnswerRecord::new(question.clone(), submission.choice);

        let next_cursor = if cursor.question_index + 1 < questions.len() {
            Some(Cursor {
                question_index: cursor.question_index + 1,
                ..cursor
            })
        } else if cursor.theme_index + 1 < self.ordered_themes.len() {
            Some(Cursor {
                theme_index: cursor.theme_index + 1,
                question_index: 0,
            })
        } else {
            None
        };

        let feedback = Feedback {
            is_correct: record.is_correct,
            correct_choice: question.correct_choice,
            correct_text: question.correct_answer().unwrap_or_default().to_string(),
            finished: next_cursor.is_none(),
        };

        let mut history = self.history.clone();
        history.push(record);

        let next = SessionState {
            bank: Arc::clone(&self.bank),
            ordered_themes: self.ordered_themes.clone(),
            cursor: next_cursor,
            history,
            scheme: self.scheme,
        };
        Ok((next, feedback))
    }

    /// Score of everything answered so far.
    pub fn report(&self) -> ScoreReport {
        ScoreReport::from_history(&self.history, self.scheme)
    }

    /// Answers grouped for review: wrong ones first, each in answer order.
    pub fn review(&self) -> (Vec<&AnswerRecord>, Vec<&AnswerRecord>) {
        self.history.iter().partition(|record| !record.is_correct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str, theme: u8, correct: usize) -> Question {
        Question {
            text: text.to_string(),
            choices: vec!["1".into(), "2".into(), "3".into(), "4".into()],
            correct_choice: correct,
            theme: Theme::new(theme),
            source_exam: "2022-1".to_string(),
            explanation: None,
        }
    }

    fn bank(questions: Vec<Question>) -> ThemeBank {
        let mut bank = ThemeBank::new();
        for question in questions {
            bank.push(question);
        }
        bank
    }

    fn answer_all(mut state: SessionState, choices: &[usize]) -> SessionState {
        for choice in choices {
            let (next, _) = state
                .submit(Submission::new(state.position(), *choice))
                .unwrap();
            state = next;
        }
        state
    }

    #[test]
    fn test_start_on_empty_bank() {
        let mut empty = ThemeBank::new();
        empty.add_theme(Theme::new(1));
        assert!(SessionState::start(empty, ScoringScheme::Percentage).is_none());
    }

    #[test]
    fn test_start_skips_empty_themes() {
        let mut b = bank(vec![question("q", 3, 1)]);
        b.add_theme(Theme::new(1));
        let state = SessionState::start(b, ScoringScheme::Percentage).unwrap();

        assert_eq!(state.ordered_themes(), &[Theme::new(3)]);
        assert_eq!(state.current_theme(), Some(Theme::new(3)));
        assert_eq!(state.phase(), SessionPhase::InProgress);
    }

    #[test]
    fn test_walks_themes_in_order() {
        let b = bank(vec![
            question("b1", 2, 1),
            question("a1", 1, 1),
            question("a2", 1, 1),
        ]);
        let mut state = SessionState::start(b, ScoringScheme::Percentage).unwrap();
        let mut seen = Vec::new();

        while let Some(question) = state.current_question() {
            seen.push(question.text.clone());
            let (next, _) = state.submit(Submission::new(state.position(), 1)).unwrap();
            state = next;
        }

        assert_eq!(seen, vec!["a1", "a2", "b1"]);
        assert!(state.is_complete());
        assert_eq!(state.current_theme(), None);
    }

    #[test]
    fn test_submit_does_not_touch_receiver() {
        let state = SessionState::start(bank(vec![question("q", 1, 2)]), ScoringScheme::Percentage)
            .unwrap();
        let (next, feedback) = state.submit(Submission::new(0, 2)).unwrap();

        assert!(state.history().is_empty());
        assert_eq!(next.history().len(), 1);
        assert!(feedback.is_correct);
        assert!(feedback.finished);
        assert_eq!(feedback.correct_text, "2");
    }

    #[test]
    fn test_feedback_on_wrong_answer() {
        let state = SessionState::start(
            bank(vec![question("q", 1, 3), question("r", 1, 1)]),
            ScoringScheme::Percentage,
        )
        .unwrap();
        let (_, feedback) = state.submit(Submission::new(0, 1)).unwrap();

        assert!(!feedback.is_correct);
        assert_eq!(feedback.correct_choice, 3);
        assert_eq!(feedback.correct_text, "3");
        assert!(!feedback.finished);
    }

    #[test]
    fn test_rejects_after_complete() {
        let state = SessionState::start(bank(vec![question("q", 1, 1)]), ScoringScheme::Percentage)
            .unwrap();
        let done = answer_all(state, &[1]);

        assert_eq!(
            done.submit(Submission::new(1, 1)).unwrap_err(),
            SubmitError::Complete
        );
        assert_eq!(done.history().len(), 1);
    }

    #[test]
    fn test_rejects_duplicate_submission() {
        let state = SessionState::start(
            bank(vec![question("q", 1, 1), question("r", 1, 1)]),
            ScoringScheme::Percentage,
        )
        .unwrap();
        let (next, _) = state.submit(Submission::new(0, 1)).unwrap();

        assert_eq!(
            next.submit(Submission::new(0, 1)).unwrap_err(),
            SubmitError::Stale {
                expected: 1,
                got: 0
            }
        );
    }

    #[test]
    fn test_rejects_missing_choice() {
        let state = SessionState::start(bank(vec![question("q", 1, 1)]), ScoringScheme::Percentage)
            .unwrap();
        assert!(matches!(
            state.submit(Submission::new(0, 5)),
            Err(SubmitError::ChoiceOutOfRange { choice: 5, choices: 4 })
        ));
        assert!(state.submit(Submission::new(0, 0)).is_err());
    }

    #[test]
    fn test_unanswered_counts_as_wrong() {
        let state = SessionState::start(bank(vec![question("q", 1, 1)]), ScoringScheme::Percentage)
            .unwrap();
        let (next, feedback) = state.submit(Submission::unanswered(0)).unwrap();

        assert!(!feedback.is_correct);
        assert_eq!(next.history()[0].selected, None);
        assert_eq!(next.history()[0].selected_text(), None);
    }

    #[test]
    fn test_broken_correct_choice_is_never_correct() {
        let state = SessionState::start(bank(vec![question("q", 1, 9)]), ScoringScheme::Percentage)
            .unwrap();
        let (next, feedback) = state.submit(Submission::new(0, 4)).unwrap();

        assert!(!feedback.is_correct);
        assert_eq!(feedback.correct_text, "");
        assert!(next.is_complete());
    }

    #[test]
    fn test_replay_gives_same_report() {
        let questions = vec![
            question("a", 1, 1),
            question("b", 2, 2),
            question("c", 3, 3),
        ];
        let first = answer_all(
            SessionState::start(bank(questions.clone()), ScoringScheme::Percentage).unwrap(),
            &[1, 1, 3],
        );
        let second = answer_all(
            SessionState::start(bank(questions), ScoringScheme::Percentage).unwrap(),
            &[1, 1, 3],
        );

        assert_eq!(first.report(), second.report());
        assert_eq!(first.report(), first.report());

        let (wrong, right) = first.review();
        assert_eq!(wrong.len(), 1);
        assert_eq!(right.len(), 2);
    }

    #[test]
    fn test_broken_cursor_is_an_error() {
        let state = SessionState::start(
            bank(vec![question("a", 1, 1), question("b", 2, 1)]),
            ScoringScheme::Percentage,
        )
        .unwrap();

        for cursor in [
            Cursor {
                theme_index: 5,
                question_index: 0,
            },
            Cursor {
                theme_index: 0,
                question_index: 3,
            },
        ] {
            let broken = SessionState {
                cursor: Some(cursor),
                ..state.clone()
            };
            assert_eq!(
                broken.submit(Submission::new(0, 1)).unwrap_err(),
                SubmitError::CursorOutOfBank(cursor)
            );
            assert!(broken.history().is_empty());
        }
    }
}
