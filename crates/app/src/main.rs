use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use scaled_core::model::{PracticeSettings, PracticeState};
use services::{AppServices, ClickOutput, Clock, PracticeService, SilentOutput};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, context::build_app_context};

const DEFAULT_DB_URL: &str = "sqlite://scaled.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
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

struct DesktopApp {
    practice: Arc<PracticeService>,
    click_output: Arc<dyn ClickOutput>,
}

impl UiApp for DesktopApp {
    fn practice(&self) -> Arc<PracticeService> {
        Arc::clone(&self.practice)
    }

    fn click_output(&self) -> Arc<dyn ClickOutput> {
        Arc::clone(&self.click_output)
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app [ui]  [--db <sqlite_url>]   launch the practice window (default)");
    eprintln!("  app status [--db <sqlite_url>]  print progress of the stored session");
    eprintln!("  app reset  [--db <sqlite_url>]  discard progress and reshuffle");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SCALED_DB_URL, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Status,
    Reset,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "status" => Some(Self::Status),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env_db_url: Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = env_db_url.map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url })
    }
}

fn split_command(mut argv: Vec<String>) -> Result<(Command, Vec<String>), ArgsError> {
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some(first) if first.starts_with('-') => Command::Ui,
        Some(first) => {
            Command::from_arg(first).ok_or_else(|| ArgsError::UnknownArg(first.to_owned()))?
        }
    };
    if argv.first().is_some_and(|first| !first.starts_with('-')) {
        argv.remove(0);
    }
    Ok((cmd, argv))
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
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

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

#[cfg(feature = "audio")]
fn open_click_output() -> Arc<dyn ClickOutput> {
    match services::metronome::CpalOutput::open() {
        Ok(output) => Arc::new(output),
        Err(err) => {
            warn!(%err, "audio output unavailable; metronome disabled");
            Arc::new(SilentOutput)
        }
    }
}

#[cfg(not(feature = "audio"))]
fn open_click_output() -> Arc<dyn ClickOutput> {
    warn!("built without audio support; metronome disabled");
    Arc::new(SilentOutput)
}

/// Read-only: nothing is written back, even when the stored state is missing.
async fn print_status(services: &AppServices) -> Result<(), Box<dyn std::error::Error>> {
    let settings = services.settings().load().await?;
    let state = services.practice().load_state(&settings).await?;
    print!("{}", status_report(&settings, &state));
    Ok(())
}

fn status_report(settings: &PracticeSettings, state: &PracticeState) -> String {
    let required = settings.repetitions_required();
    let mut out = format!(
        "{} of {} scales completed\n",
        state.completed_count(),
        state.scale_progress().len()
    );
    if let Some(current) = state.current_scale() {
        out.push_str(&format!("current: {}\n", current.name()));
    }
    for &index in state.practice_order() {
        let Some(scale) = state.scale_progress().get(index) else {
            continue;
        };
        let mark = if scale.completed() { "x" } else { " " };
        out.push_str(&format!(
            "[{mark}] {:<12} {}/{required}\n",
            scale.name(),
            scale.success_count()
        ));
    }
    out
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    if argv
        .first()
        .is_some_and(|first| first == "--help" || first == "-h")
    {
        print_usage();
        return Ok(());
    }

    let parsed = split_command(argv).and_then(|(cmd, rest)| {
        let args = Args::parse(&mut rest.into_iter(), std::env::var("SCALED_DB_URL").ok())?;
        Ok((cmd, args))
    });
    let (cmd, args) = parsed.map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&args.db_url)?;
    let services = AppServices::new_sqlite(&args.db_url, Clock::system()).await?;
    info!(db_url = %args.db_url, ?cmd, "storage ready");

    match cmd {
        Command::Ui => {
            let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
                practice: services.practice(),
                click_output: open_click_output(),
            });
            let context = build_app_context(&app);

            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("Scaled")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Status => print_status(&services).await,
        Command::Reset => {
            let state = services.practice().reset_progress().await?;
            println!(
                "progress reset; {} scales reshuffled",
                state.scale_progress().len()
            );
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
