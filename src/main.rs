use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use exam_quiz::config::{
    parse_selection, parse_server_addr, PlayConfig, ScoringChoice, ServeConfig, SourceConfig,
    DEFAULT_DATA_DIR,
};
use exam_quiz::data::QUESTIONS_PER_THEME;
use exam_quiz::protocol::DEFAULT_PORT;
use exam_quiz::QuizError;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve exam questions to quiz clients over WebSocket
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "EXAM_QUIZ_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Directory holding one JSON file per exam sitting
        #[arg(short, long, env = "EXAM_QUIZ_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,

        /// Questions drawn per subject for random quizzes
        #[arg(long, default_value_t = QUESTIONS_PER_THEME)]
        per_theme: usize,
    },
    /// Take a quiz in the terminal
    Play {
        /// Exam sitting to take in full, e.g. 2022-1 (random quiz when omitted)
        #[arg(short, long)]
        exam: Option<String>,

        /// Directory holding one JSON file per exam sitting
        #[arg(short, long, env = "EXAM_QUIZ_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,

        /// Fetch questions from a lookup service at host[:port] instead
        #[arg(short, long, env = "EXAM_QUIZ_SERVER")]
        server: Option<String>,

        /// Questions drawn per subject for random quizzes
        #[arg(long, default_value_t = QUESTIONS_PER_THEME)]
        per_theme: usize,

        /// Override the scoring scale picked for the quiz mode
        #[arg(long, value_enum)]
        scoring: Option<ScoringChoice>,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let result = match args.command {
        Command::Serve {
            port,
            data_dir,
            per_theme,
        } => {
            init_logging();
            exam_quiz::server::run(ServeConfig {
                port,
                data_dir,
                per_theme,
            })
            .await
        }
        Command::Play {
            exam,
            data_dir,
            server,
            per_theme,
            scoring,
        } => match play_config(exam, data_dir, server, per_theme, scoring) {
            Ok(config) => exam_quiz::play(config).await,
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging() {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    pretty_env_logger::formatted_builder()
        .parse_filters(&filters)
        .init();
}

fn play_config(
    exam: Option<String>,
    data_dir: PathBuf,
    server: Option<String>,
    per_theme: usize,
    scoring: Option<ScoringChoice>,
) -> Result<PlayConfig, QuizError> {
    let selection =
        parse_selection(exam.as_deref()).map_err(|e| QuizError::Config(e.to_string()))?;

    let source = match server {
        Some(addr) => {
            let (host, port) = parse_server_addr(&addr, DEFAULT_PORT).map_err(QuizError::Config)?;
            SourceConfig::Remote { host, port }
        }
        None => SourceConfig::Local {
            data_dir,
            per_theme,
        },
    };

    Ok(PlayConfig {
        selection,
        source,
        scoring: scoring.map(Into::into),
    })
}
