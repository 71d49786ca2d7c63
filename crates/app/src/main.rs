use std::fmt;
use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use quiz_core::Clock;
use quiz_core::collect::{AnswerCollector, InputSignal};
use quiz_core::model::{Question, QuestionError, QuestionMode};
use services::{
    HttpTelemetry, SceneTransition, SessionConfig, SessionController, SessionPhase, StagePresenter,
    SubmitReport, TelemetryEmitter,
    telemetry::HttpTelemetryConfig,
};
use storage::repository::{InMemoryProfile, ProfileRepository};
use storage::sqlite::SqliteProfile;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidMode { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidMode { raw } => write!(f, "invalid --mode value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--mode choice|text|place] [--db <sqlite_url>|memory]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --mode choice");
    eprintln!("  --db memory");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_TELEMETRY_URL, QUIZ_TELEMETRY_TOKEN  optional telemetry endpoint");
}

struct Args {
    mode: QuestionMode,
    db_url: Option<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut mode = QuestionMode::ChoiceSet;
        let mut db_url = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--mode" => {
                    let value = require_value(args, "--mode")?;
                    mode = match value.as_str() {
                        "choice" => QuestionMode::ChoiceSet,
                        "text" => QuestionMode::FreeText,
                        "place" => QuestionMode::Placement,
                        _ => return Err(ArgsError::InvalidMode { raw: value }),
                    };
                }
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    if value != "memory" {
                        db_url = Some(normalize_sqlite_url(value));
                    }
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { mode, db_url })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

//
// ─── CONSOLE WIRING ───────────────────────────────────────────────────────────
//

/// Stage presenter that narrates the sequence on stdout.
struct ConsolePresenter;

impl StagePresenter for ConsolePresenter {
    fn learner_position(&self) -> Option<f32> {
        Some(0.0)
    }

    fn target_position(&self) -> Option<f32> {
        Some(6.0)
    }

    fn move_learner(&self, x: f32) {
        println!("  [stage] learner at {x:.1}");
    }

    fn show_learner_speech(&self, text: &str) {
        println!("  you say: \"{text}\"");
    }

    fn show_target_speech(&self, text: &str) {
        println!("  teacher says: \"{text}\"");
    }

    fn clear_speech(&self) {}

    fn show_notice(&self, signal: &InputSignal) {
        println!("  ({:?}) {}", signal.severity, signal.message);
    }

    fn show_progress(&self, value: f32, message: &str) {
        println!("  progress: {value:.0}% - {message}");
    }
}

struct ConsoleTransition {
    done: Arc<AtomicBool>,
}

impl SceneTransition for ConsoleTransition {
    fn begin(&self, final_score: u8) {
        println!("== Stage cleared with a score of {final_score}! ==");
        self.done.store(true, Ordering::SeqCst);
    }
}

fn sample_question(mode: QuestionMode) -> Result<(Question, Vec<String>), QuestionError> {
    let canon = |values: &[&str]| values.iter().map(|v| (*v).to_owned()).collect::<Vec<_>>();
    Ok(match mode {
        QuestionMode::ChoiceSet => (
            Question::choice_set(
                "Which of these are programming languages?",
                canon(&["python", "java"]),
                70.0,
            )?,
            canon(&["Python", "Excel", "Java"]),
        ),
        QuestionMode::FreeText => (
            Question::free_text(
                "Name up to three programming languages",
                canon(&["python", "java", "rust"]),
                1,
                3,
                false,
                70.0,
            )?,
            Vec::new(),
        ),
        QuestionMode::Placement => (
            Question::placement(
                "Drag the operation that combines two numbers into their sum",
                canon(&["addition"]),
            )?,
            canon(&["addition", "subtraction", "division"]),
        ),
    })
}

fn print_prompt(controller: &SessionController) {
    println!();
    println!("Q: {}", controller.question().text());
    match controller.collector() {
        AnswerCollector::ChoiceSet(collector) => {
            for (index, option) in collector.options().iter().enumerate() {
                let mark = if option.is_selected() { "x" } else { " " };
                println!("  {index}: [{mark}] {}", option.label());
            }
            println!("type an option number to toggle, 's' to submit, 'q' to quit");
        }
        AnswerCollector::FreeText(collector) => {
            println!("  answers so far: {:?}", collector.entries());
            println!("type an answer, 's' to submit, 'q' to quit");
        }
        AnswerCollector::Placement(collector) => {
            for (index, item) in collector.items().iter().enumerate() {
                println!("  {index}: {}", item.label());
            }
            println!("type an item number to place it, 'q' to quit");
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let profile: Arc<dyn ProfileRepository> = match &args.db_url {
        Some(db_url) => {
            prepare_sqlite_file(db_url)?;
            let sqlite = SqliteProfile::connect(db_url).await?;
            sqlite.migrate().await?;
            Arc::new(sqlite)
        }
        None => Arc::new(InMemoryProfile::new()),
    };

    let telemetry: Arc<dyn TelemetryEmitter> =
        Arc::new(HttpTelemetry::new(HttpTelemetryConfig::from_env()));

    let done = Arc::new(AtomicBool::new(false));
    let (question, labels) = sample_question(args.mode)?;
    let mut controller = SessionController::start(
        question,
        labels,
        SessionConfig::default(),
        Clock::default_clock(),
        Arc::new(ConsolePresenter),
        telemetry,
        Arc::new(ConsoleTransition { done: done.clone() }),
        profile,
    )
    .await;

    if let Some(score) = controller.previous_score() {
        println!("Welcome back! Your last score was {score}.");
    }

    let stdin = std::io::stdin();
    loop {
        if done.load(Ordering::SeqCst) || controller.phase() == SessionPhase::Transitioning {
            break;
        }
        print_prompt(&controller);

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        let mode = controller.question().mode();

        let report = match (mode, input) {
            (_, "q") => break,
            (_, "s") => controller.submit().await,
            (QuestionMode::ChoiceSet, _) => match input.parse::<usize>() {
                Ok(index) => controller.toggle_choice(index),
                Err(_) => {
                    println!("  type an option number, 's', or 'q'");
                    continue;
                }
            },
            (QuestionMode::Placement, _) => match input.parse::<usize>() {
                Ok(index) => controller.place_item(index).await,
                Err(_) => {
                    println!("  type an item number or 'q'");
                    continue;
                }
            },
            (QuestionMode::FreeText, _) => controller.enter_text(input).await,
        };

        if let SubmitReport::Evaluated(outcome) = report {
            if outcome.completed {
                break;
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
