mod question;

pub use question::{Question, Theme, ThemeBank, THEME_NAMES};
