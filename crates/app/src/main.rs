use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{AppServices, Clock};
use training_core::model::{FormationId, SectionId, UserId};
use tracing_subscriber::EnvFilter;
use ui::{App, ContentOpenerRef, SystemOpener, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidId { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidId { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
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

fn parse_id<T: FromStr>(flag: &'static str, raw: String) -> Result<T, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidId { flag, raw })
}

/// Environment fallback for an id flag; unparsable values fall back to the default.
fn env_id<T: FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

struct DesktopApp {
    user_id: UserId,
    formation_id: FormationId,
    section_id: SectionId,
    services: AppServices,
    opener: ContentOpenerRef,
}

impl UiApp for DesktopApp {
    fn user_id(&self) -> UserId {
        self.user_id
    }

    fn formation_id(&self) -> FormationId {
        self.formation_id
    }

    fn section_id(&self) -> SectionId {
        self.section_id
    }

    fn services(&self) -> AppServices {
        self.services.clone()
    }

    fn content_opener(&self) -> ContentOpenerRef {
        Arc::clone(&self.opener)
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    user_id: UserId,
    formation_id: FormationId,
    section_id: SectionId,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- [--db <sqlite_url>] [--user-id <id>] [--formation-id <id>] [--section-id <id>]"
    );
    eprintln!("  cargo run -p storage --bin seed -- --help   # demo lessons and quiz");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://training.sqlite3");
    eprintln!("  --user-id 1 --formation-id 1 --section-id 1");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TRAINING_DB_URL, TRAINING_USER_ID, TRAINING_FORMATION_ID, TRAINING_SECTION_ID");
    eprintln!("  RUST_LOG (default: info)");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut db_url = std::env::var("TRAINING_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://training.sqlite3".into(), normalize_sqlite_url);
        let mut user_id = env_id("TRAINING_USER_ID", UserId::new(1));
        let mut formation_id = env_id("TRAINING_FORMATION_ID", FormationId::new(1));
        let mut section_id = env_id("TRAINING_SECTION_ID", SectionId::new(1));

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--user-id" => user_id = parse_id("--user-id", require_value(args, "--user-id")?)?,
                "--formation-id" => {
                    formation_id =
                        parse_id("--formation-id", require_value(args, "--formation-id")?)?;
                }
                "--section-id" => {
                    section_id = parse_id("--section-id", require_value(args, "--section-id")?)?;
                }
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Some(Self {
            db_url,
            user_id,
            formation_id,
            section_id,
        }))
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

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = match Args::parse(&mut argv) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            return Err(err.into());
        }
    };

    init_tracing();

    // Open + migrate SQLite at startup; the library crates never touch the filesystem layout.
    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::system()).await?;
    tracing::info!(
        db = %parsed.db_url,
        user_id = parsed.user_id.value(),
        formation_id = parsed.formation_id.value(),
        section_id = parsed.section_id.value(),
        "starting training app"
    );

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        user_id: parsed.user_id,
        formation_id: parsed.formation_id,
        section_id: parsed.section_id,
        services,
        opener: Arc::new(SystemOpener),
    });
    let context = build_app_context(&app);

    // Some dev setups default to an always-on-top window; disable it explicitly.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Training")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
