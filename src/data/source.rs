use async_trait::async_trait;

use crate::models::ThemeBank;

use super::loader::{ExamLibrary, LoadError, Selection};

/// Anything that can produce the question bank for a session.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn fetch(&self, selection: &Selection) -> Result<ThemeBank, LoadError>;
}

/// Reads exam files straight from a local data directory.
#[derive(Debug, Clone)]
pub struct LocalSource {
    library: ExamLibrary,
    per_theme: usize,
}

impl LocalSource {
    pub fn new(library: ExamLibrary, per_theme: usize) -> Self {
        Self { library, per_theme }
    }

    pub fn library(&self) -> &ExamLibrary {
        &self.library
    }
}

#[async_trait]
impl QuestionSource for LocalSource {
    async fn fetch(&self, selection: &Selection) -> Result<ThemeBank, LoadError> {
        match selection {
            Selection::Random => self.library.random_bank(self.per_theme).await,
            Selection::Exam(key) => self.library.exam_bank(key).await,
        }
    }
}
