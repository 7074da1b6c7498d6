use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Display names of the three exam subjects, indexed by `theme - 1`.
pub const THEME_NAMES: [&str; 3] = [
    "정보시스템 기반 기술",
    "프로그래밍 언어 활용",
    "데이터베이스 활용",
];

const UNKNOWN_THEME_NAME: &str = "미분류 과목";

/// Subject number a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Theme(u8);

impl Theme {
    /// The three subjects of the exam, in order.
    pub const KNOWN: [Theme; 3] = [Theme(1), Theme(2), Theme(3)];

    pub const fn new(number: u8) -> Self {
        Self(number)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn is_known(self) -> bool {
        (1..=THEME_NAMES.len()).contains(&usize::from(self.0))
    }

    pub fn name(self) -> &'static str {
        usize::from(self.0)
            .checked_sub(1)
            .and_then(|index| THEME_NAMES.get(index))
            .copied()
            .unwrap_or(UNKNOWN_THEME_NAME)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}과목 : {}", self.0, self.name())
    }
}

// Accepts `3` as well as `"3"`: theme numbers arrive as strings when they
// are JSON object keys, including inside tagged protocol messages.
impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ThemeVisitor;

        impl Visitor<'_> for ThemeVisitor {
            type Value = Theme;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a theme number")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Theme, E> {
                u8::try_from(value)
                    .map(Theme)
                    .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(value), &self))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Theme, E> {
                u8::try_from(value)
                    .map(Theme)
                    .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Theme, E> {
                value
                    .trim()
                    .parse()
                    .map(Theme)
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
            }
        }

        deserializer.deserialize_any(ThemeVisitor)
    }
}

/// One multiple-choice item, in the shape the exam files store it.
///
/// `text`, `choices` and `explanation` may carry inline HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    #[serde(rename = "answers")]
    pub choices: Vec<String>,
    /// 1-based index into `choices`.
    #[serde(rename = "correct")]
    pub correct_choice: usize,
    pub theme: Theme,
    #[serde(rename = "date", default, skip_serializing_if = "String::is_empty")]
    pub source_exam: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    pub fn is_correct(&self, choice: Option<usize>) -> bool {
        choice == Some(self.correct_choice)
    }

    /// Text of the 1-based `choice`, if it exists.
    pub fn choice_text(&self, choice: usize) -> Option<&str> {
        choice
            .checked_sub(1)
            .and_then(|index| self.choices.get(index))
            .map(String::as_str)
    }

    /// Text of the correct choice. `None` means the stored data is broken.
    pub fn correct_answer(&self) -> Option<&str> {
        self.choice_text(self.correct_choice)
    }
}

/// Questions of one session, grouped by subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeBank {
    themes: BTreeMap<Theme, Vec<Question>>,
}

impl ThemeBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures `theme` has an entry, even if it stays empty.
    pub fn add_theme(&mut self, theme: Theme) {
        self.themes.entry(theme).or_default();
    }

    pub fn push(&mut self, question: Question) {
        self.themes.entry(question.theme).or_default().push(question);
    }

    pub fn insert(&mut self, theme: Theme, questions: Vec<Question>) {
        self.themes.insert(theme, questions);
    }

    /// Questions of `theme`; empty when the theme is absent.
    pub fn get(&self, theme: Theme) -> &[Question] {
        self.themes.get(&theme).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every theme present, including empty ones, ascending.
    pub fn themes(&self) -> impl Iterator<Item = Theme> + '_ {
        self.themes.keys().copied()
    }

    /// Ascending themes that have at least one question.
    pub fn themes_with_questions(&self) -> Vec<Theme> {
        self.themes
            .iter()
            .filter(|(_, questions)| !questions.is_empty())
            .map(|(theme, _)| *theme)
            .collect()
    }

    pub fn total_questions(&self) -> usize {
        self.themes.values().map(Vec::len).sum()
    }

    /// True when no theme holds a question.
    pub fn is_empty(&self) -> bool {
        self.total_questions() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Theme, &[Question])> {
        self.themes
            .iter()
            .map(|(theme, questions)| (*theme, questions.as_slice()))
    }
}
