mod loader;
mod source;

pub use loader::{
    group_by_theme, sample_by_theme, shuffled, ExamKey, ExamLibrary, LoadError, Selection,
    QUESTIONS_PER_THEME,
};
pub use source::{LocalSource, QuestionSource};
