use std::fmt;

use chrono::{DateTime, Utc};
use storage::repository::Storage;
use training_core::model::{
    Answer, LessonDraft, LessonId, LessonKind, LessonMetadata, Question, Quiz, QuizId,
    QuizSettings, SectionId,
};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    section_id: SectionId,
    quiz_id: QuizId,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSectionId { raw: String },
    InvalidQuizId { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSectionId { raw } => write!(f, "invalid --section-id value: {raw}"),
            ArgsError::InvalidQuizId { raw } => write!(f, "invalid --quiz-id value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("TRAINING_DB_URL")
            .unwrap_or_else(|_| "sqlite://training.sqlite3?mode=rwc".into());
        let mut section_id = std::env::var("TRAINING_SECTION_ID")
            .ok()
            .and_then(|value| value.parse::<SectionId>().ok())
            .unwrap_or_else(|| SectionId::new(1));
        let mut quiz_id = QuizId::new(1);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--section-id" => {
                    let value = require_value(&mut args, "--section-id")?;
                    section_id = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSectionId { raw: value.clone() })?;
                }
                "--quiz-id" => {
                    let value = require_value(&mut args, "--quiz-id")?;
                    quiz_id = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidQuizId { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            section_id,
            quiz_id,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite://training.sqlite3?mode=rwc)");
    eprintln!("  --section-id <id>         Section receiving the demo lessons (default: 1)");
    eprintln!("  --quiz-id <id>            Quiz id to upsert (default: 1)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  TRAINING_DB_URL, TRAINING_SECTION_ID");
}

fn demo_quiz(id: QuizId, lesson: LessonId) -> Result<Quiz, Box<dyn std::error::Error>> {
    let questions = vec![
        Question::multiple_choice(
            "Which extinguisher class covers electrical fires?",
            2,
            0,
            vec![
                Answer::new("Class A", false, 0),
                Answer::new("Class C", true, 1),
                Answer::new("Class D", false, 2),
            ],
        ),
        Question::multiple_choice(
            "Where is the assembly point?",
            1,
            1,
            vec![
                Answer::new("Main parking lot", true, 0),
                Answer::new("Basement", false, 1),
            ],
        ),
        Question::free_text("Describe the first thing you do when the alarm sounds.", 2, 2),
    ];

    Ok(Quiz::new(
        id,
        Some(lesson),
        "Fire safety check",
        "Short check after the safety briefing.",
        QuizSettings::default(),
        questions,
    )?)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let existing = storage.lessons.list_lessons(args.section_id).await?;
    let mut next_position = u32::try_from(existing.len()).unwrap_or(u32::MAX);

    let drafts = vec![
        LessonDraft::new(args.section_id, "Safety briefing", LessonKind::Video)
            .with_description("A **ten minute** walkthrough of site safety.")
            .with_duration(10)
            .with_metadata(LessonMetadata::url("https://media.example.com/safety.mp4")?),
        LessonDraft::new(args.section_id, "Evacuation handbook", LessonKind::Document)
            .with_file("handbook.pdf")
            .with_metadata(LessonMetadata::file("handbook.pdf").with_pages(12)?),
        LessonDraft::new(args.section_id, "Quarterly review deck", LessonKind::Presentation)
            .with_metadata(
                LessonMetadata::url("https://cdn.example.com/review.pptx")?.with_slides(24)?,
            ),
        LessonDraft::new(args.section_id, "Knowledge check", LessonKind::Interactive),
    ];

    let mut inserted = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let validated = draft.validate(now)?;
        let id = storage.lessons.insert_lesson(&validated, next_position).await?;
        next_position = next_position.saturating_add(1);
        inserted.push(id);
    }

    if let Some(&quiz_lesson) = inserted.last() {
        let quiz = demo_quiz(args.quiz_id, quiz_lesson)?;
        storage.quizzes.upsert_quiz(&quiz).await?;
    }

    println!(
        "Seeded section {} with {} lessons and quiz {} into {}",
        args.section_id.value(),
        inserted.len(),
        args.quiz_id.value(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
