//! Score report derived from the answer history.

use std::collections::BTreeMap;

use crate::data::QUESTIONS_PER_THEME;
use crate::models::{Theme, ThemeBank};

use super::state::AnswerRecord;

/// Per-theme score below which the subject fails (과락).
pub const SUBJECT_MINIMUM: u32 = 40;
/// Average needed to pass.
pub const PASS_AVERAGE: u32 = 60;

/// How correct answers turn into a per-theme score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringScheme {
    /// Fixed points per correct answer. Assumes 20 questions per theme.
    FixedPoint { points_per_question: u32 },
    /// Share of correct answers, rounded to a whole percent.
    Percentage,
}

impl ScoringScheme {
    pub const FIXED_FIVE: ScoringScheme = ScoringScheme::FixedPoint {
        points_per_question: 5,
    };

    /// The multiplier only adds up to 100 when every theme that has
    /// questions has exactly [`QUESTIONS_PER_THEME`] of them. Any other
    /// bank is scored in percent.
    pub fn for_bank(bank: &ThemeBank) -> Self {
        let mut sizes = bank
            .iter()
            .map(|(_, questions)| questions.len())
            .filter(|&len| len > 0)
            .peekable();

        if sizes.peek().is_some() && sizes.all(|len| len == QUESTIONS_PER_THEME) {
            Self::FIXED_FIVE
        } else {
            Self::Percentage
        }
    }

    pub fn score(self, correct: usize, total: usize) -> u32 {
        if total == 0 {
            return 0;
        }
        match self {
            ScoringScheme::FixedPoint {
                points_per_question,
            } => correct as u32 * points_per_question,
            ScoringScheme::Percentage => rounded_div(correct as u32 * 100, total as u32),
        }
    }
}

/// Row of the per-theme result table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeScore {
    pub theme: Theme,
    pub correct: usize,
    pub wrong: usize,
    pub score: u32,
    /// Answered at least once and scored under [`SUBJECT_MINIMUM`].
    pub failed_minimum: bool,
}

impl ThemeScore {
    pub fn total(&self) -> usize {
        self.correct + self.wrong
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreReport {
    pub scheme: ScoringScheme,
    pub themes: Vec<ThemeScore>,
    /// Mean over themes that had questions; 0 when none did.
    pub average: u32,
    pub passed: bool,
}

impl ScoreReport {
    pub fn from_history(history: &[AnswerRecord], scheme: ScoringScheme) -> Self {
        let mut tallies: BTreeMap<Theme, (usize, usize)> =
            Theme::KNOWN.iter().map(|theme| (*theme, (0, 0))).collect();

        for record in history {
            let (correct, total) = tallies.entry(record.question.theme).or_default();
            *total += 1;
            if record.is_correct {
                *correct += 1;
            }
        }

        let themes: Vec<ThemeScore> = tallies
            .into_iter()
            .map(|(theme, (correct, total))| {
                let score = scheme.score(correct, total);
                ThemeScore {
                    theme,
                    correct,
                    wrong: total - correct,
                    score,
                    failed_minimum: total > 0 && score < SUBJECT_MINIMUM,
                }
            })
            .collect();

        let scored: Vec<u32> = themes
            .iter()
            .filter(|row| row.total() > 0)
            .map(|row| row.score)
            .collect();
        let average = if scored.is_empty() {
            0
        } else {
            rounded_div(scored.iter().sum(), scored.len() as u32)
        };

        let passed =
            !scored.is_empty() && average >= PASS_AVERAGE && themes.iter().all(|row| !row.failed_minimum);

        Self {
            scheme,
            themes,
            average,
            passed,
        }
    }

    pub fn theme(&self, theme: Theme) -> Option<&ThemeScore> {
        self.themes.iter().find(|row| row.theme == theme)
    }

    pub fn failed_themes(&self) -> impl Iterator<Item = &ThemeScore> {
        self.themes.iter().filter(|row| row.failed_minimum)
    }
}

/// Integer division rounding halves up.
fn rounded_div(numerator: u32, denominator: u32) -> u32 {
    (numerator * 2 + denominator) / (denominator * 2)
}
