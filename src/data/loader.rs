use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Question, Theme, ThemeBank};

/// Sample size drawn per theme in random mode.
pub const QUESTIONS_PER_THEME: usize = 20;

const EXAM_FILE_EXTENSION: &str = "json";

/// Why a question bank could not be produced.
///
/// Serializable so the lookup service can hand it to clients unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum LoadError {
    #[error("no exam data for `{key}`")]
    NotFound { key: String },
    #[error("bad exam key: {reason}")]
    BadRequest { reason: String },
    #[error("question data is corrupt: {detail}")]
    Parse { detail: String },
    #[error("could not read question data: {detail}")]
    Server { detail: String },
    #[error("question service unavailable: {detail}")]
    Transport { detail: String },
}

impl LoadError {
    /// HTTP-equivalent status code.
    pub fn status(&self) -> u16 {
        match self {
            LoadError::NotFound { .. } => 404,
            LoadError::BadRequest { .. } => 400,
            LoadError::Parse { .. } | LoadError::Server { .. } => 500,
            LoadError::Transport { .. } => 503,
        }
    }

    pub(crate) fn transport(err: impl fmt::Display) -> Self {
        LoadError::Transport {
            detail: err.to_string(),
        }
    }

    fn read(path: &Path, err: io::Error) -> Self {
        LoadError::Server {
            detail: format!("{}: {}", path.display(), err),
        }
    }

    fn parse(path: &Path, err: serde_json::Error) -> Self {
        LoadError::Parse {
            detail: format!("{}: {}", path.display(), err),
        }
    }
}

/// Identifier of one exam sitting, e.g. `2022-1`.
///
/// Names a file inside the data directory, so it may not contain path
/// components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExamKey(String);

impl ExamKey {
    pub fn parse(raw: &str) -> Result<Self, LoadError> {
        let key = raw.trim();
        if key.is_empty() {
            return Err(LoadError::BadRequest {
                reason: "exam key is missing".to_string(),
            });
        }
        if key.starts_with('.') || key.contains(['/', '\\']) || key.contains("..") {
            return Err(LoadError::BadRequest {
                reason: format!("`{}` is not a valid exam key", key),
            });
        }
        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ExamKey {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ExamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the questions of a session are chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Random sample per theme across every exam file.
    Random,
    /// Every question of one exam sitting, in file order.
    Exam(ExamKey),
}

impl Selection {
    pub fn exam_key(&self) -> Option<&ExamKey> {
        match self {
            Selection::Random => None,
            Selection::Exam(key) => Some(key),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Random => f.write_str("모의고사 (전체 회차 랜덤)"),
            Selection::Exam(key) => write!(f, "{}회 기출", key),
        }
    }
}

/// Directory of exam files, one `<key>.json` per sitting.
#[derive(Debug, Clone)]
pub struct ExamLibrary {
    data_dir: PathBuf,
}

impl ExamLibrary {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn exam_path(&self, key: &ExamKey) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", key.as_str(), EXAM_FILE_EXTENSION))
    }

    /// Keys of every exam file in the library, sorted.
    pub async fn exam_keys(&self) -> Result<Vec<ExamKey>, LoadError> {
        let mut entries = tokio::fs::read_dir(&self.data_dir)
            .await
            .map_err(|err| LoadError::read(&self.data_dir, err))?;

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| LoadError::read(&self.data_dir, err))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXAM_FILE_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match ExamKey::parse(stem) {
                Ok(key) if key.as_str() == stem => keys.push(key),
                _ => log::warn!("Skipping exam file with unusable name: {}", path.display()),
            }
        }

        keys.sort();
        Ok(keys)
    }

    /// Questions of one exam, in file order, tagged with `key`.
    pub async fn load_exam(&self, key: &ExamKey) -> Result<Vec<Question>, LoadError> {
        let path = self.exam_path(key);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(LoadError::NotFound {
                    key: key.to_string(),
                });
            }
            Err(err) => return Err(LoadError::read(&path, err)),
        };

        let mut questions: Vec<Question> =
            serde_json::from_str(&content).map_err(|err| LoadError::parse(&path, err))?;
        for question in &mut questions {
            question.source_exam = key.to_string();
        }

        log::debug!("Loaded {} questions from {}", questions.len(), path.display());
        Ok(questions)
    }

    /// Every question of every exam file. Questions without a `date` are
    /// tagged with the key of the file they came from.
    pub async fn load_corpus(&self) -> Result<Vec<Question>, LoadError> {
        let mut corpus = Vec::new();

        for key in self.exam_keys().await? {
            let path = self.exam_path(&key);
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|err| LoadError::read(&path, err))?;
            let questions: Vec<Question> =
                serde_json::from_str(&content).map_err(|err| LoadError::parse(&path, err))?;

            corpus.extend(questions.into_iter().map(|mut question| {
                if question.source_exam.is_empty() {
                    question.source_exam = key.to_string();
                }
                question
            }));
        }

        Ok(corpus)
    }

    /// Random-mode bank: up to `per_theme` shuffled questions per theme.
    pub async fn random_bank(&self, per_theme: usize) -> Result<ThemeBank, LoadError> {
        let corpus = self.load_corpus().await?;
        Ok(sample_by_theme(corpus, per_theme, &mut rand::rng()))
    }

    /// Fixed-date bank: the whole exam, grouped by theme in file order.
    pub async fn exam_bank(&self, key: &ExamKey) -> Result<ThemeBank, LoadError> {
        let questions = self.load_exam(key).await?;
        Ok(group_by_theme(questions))
    }
}

/// Fisher-Yates shuffle into a new vector; `items` is left untouched.
pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.random_range(0..=i);
        out.swap(i, j);
    }
    out
}

/// Buckets `questions` into the known themes and keeps a random
/// `per_theme`-sized sample of each. Every known theme gets an entry.
pub fn sample_by_theme<R: Rng + ?Sized>(
    questions: Vec<Question>,
    per_theme: usize,
    rng: &mut R,
) -> ThemeBank {
    let mut grouped = ThemeBank::new();
    for theme in Theme::KNOWN {
        grouped.add_theme(theme);
    }

    for question in questions {
        if question.theme.is_known() {
            grouped.push(question);
        } else {
            log::debug!(
                "Dropping question with unknown theme {} from random sample",
                question.theme.number()
            );
        }
    }

    let mut bank = ThemeBank::new();
    for (theme, pool) in grouped.iter() {
        let mut sample = shuffled(pool, rng);
        sample.truncate(per_theme);
        bank.insert(theme, sample);
    }
    bank
}

/// Groups `questions` by theme, keeping their relative order.
pub fn group_by_theme(questions: Vec<Question>) -> ThemeBank {
    let mut bank = ThemeBank::new();
    for question in questions {
        bank.push(question);
    }
    bank
}
