//! Runtime configuration gathered from the command line and environment.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::data::{ExamLibrary, LoadError, LocalSource, QuestionSource, Selection, ExamKey};
use crate::client::RemoteSource;
use crate::session::ScoringScheme;

pub const DEFAULT_DATA_DIR: &str = "data";

/// Scoring scale picked on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScoringChoice {
    /// Five points per correct answer (20 questions per subject).
    Fixed,
    /// Percentage of correct answers per subject.
    Percentage,
}

impl From<ScoringChoice> for ScoringScheme {
    fn from(choice: ScoringChoice) -> Self {
        match choice {
            ScoringChoice::Fixed => ScoringScheme::FIXED_FIVE,
            ScoringChoice::Percentage => ScoringScheme::Percentage,
        }
    }
}

/// Settings of the question lookup service.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub per_theme: usize,
}

impl ServeConfig {
    pub fn library(&self) -> ExamLibrary {
        ExamLibrary::new(&self.data_dir)
    }
}

/// Where the quiz client gets its questions.
#[derive(Debug, Clone)]
pub enum SourceConfig {
    Local { data_dir: PathBuf, per_theme: usize },
    Remote { host: String, port: u16 },
}

impl SourceConfig {
    pub fn into_source(self) -> Box<dyn QuestionSource> {
        match self {
            SourceConfig::Local {
                data_dir,
                per_theme,
            } => Box::new(LocalSource::new(ExamLibrary::new(data_dir), per_theme)),
            SourceConfig::Remote { host, port } => Box::new(RemoteSource::new(host, port)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            SourceConfig::Local { data_dir, .. } => data_dir.display().to_string(),
            SourceConfig::Remote { host, port } => format!("ws://{}:{}", host, port),
        }
    }
}

/// Settings of the terminal quiz.
#[derive(Debug, Clone)]
pub struct PlayConfig {
    pub selection: Selection,
    pub source: SourceConfig,
    pub scoring: Option<ScoringScheme>,
}

/// Parses an exam key given on the command line.
pub fn parse_selection(exam: Option<&str>) -> Result<Selection, LoadError> {
    match exam {
        None => Ok(Selection::Random),
        Some(raw) => ExamKey::parse(raw).map(Selection::Exam),
    }
}

/// Splits `host:port`; a bare host uses `default_port`.
pub fn parse_server_addr(addr: &str, default_port: u16) -> Result<(String, u16), String> {
    let addr = addr.trim();
    match addr.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() => port
            .parse()
            .map(|port| (host.to_string(), port))
            .map_err(|_| format!("invalid port in server address `{}`", addr)),
        Some(_) => Err(format!("missing host in server address `{}`", addr)),
        None if addr.is_empty() => Err("server address is empty".to_string()),
        None => Ok((addr.to_string(), default_port)),
    }
}
