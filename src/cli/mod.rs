//! Command-line surface for the `studydesk` binary.

mod handlers;
mod interactive;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{entries::EntryDraft, models::{CompletionFlags, StudyMethod}};

pub use handlers::run;

const DATA_DIR_ENV: &str = "STUDYDESK_DATA_DIR";

#[derive(Debug, Parser)]
#[command(name = "studydesk", version, about = "Focus timer, flashcards and study progress")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Where the database and settings live (defaults to the platform data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the interactive focus timer and save the session as an entry.
    Focus {
        #[command(flatten)]
        entry: EntryArgs,
        /// Pomodoros already completed, when resuming a session
        #[arg(long, default_value_t = 0)]
        pomodoros: u32,
    },
    /// Record a session without running the timer.
    Log {
        #[command(flatten)]
        entry: EntryArgs,
        #[arg(long, default_value_t = 0)]
        hours: u32,
        #[arg(long, default_value_t = 0)]
        minutes: u32,
        #[arg(long, default_value_t = 0)]
        seconds: u32,
    },
    /// List study entries, optionally for a single day.
    Entries {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    DeleteEntry { id: String },
    /// Monthly progress summary as JSON.
    Progress {
        /// Reference day (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Days of a month that have entries.
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    Deck {
        #[command(subcommand)]
        action: DeckCommands,
    },
    Plan {
        #[command(subcommand)]
        action: PlanCommands,
    },
    Settings {
        #[command(subcommand)]
        action: SettingsCommands,
    },
}

#[derive(Debug, Clone, Args)]
pub struct EntryArgs {
    #[arg(long)]
    pub subject: String,
    #[arg(long, default_value = "")]
    pub content: String,
    /// Entry date (defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub theory: bool,
    /// Number of questions solved; also marks questions as done
    #[arg(long)]
    pub questions: Option<u32>,
    #[arg(long)]
    pub law: bool,
    #[arg(long)]
    pub review: bool,
}

impl EntryArgs {
    pub fn draft(&self) -> EntryDraft {
        EntryDraft {
            subject: self.subject.clone(),
            content: self.content.clone(),
            completion: CompletionFlags {
                theory_done: self.theory,
                questions_done: self.questions.is_some(),
                law_doctrine_done: self.law,
                active_review_done: self.review,
            },
            questions_count: self.questions.unwrap_or(0),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum DeckCommands {
    Create {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        topic: String,
        /// A card as "front::back"; repeat for more cards
        #[arg(long = "card", value_parser = parse_card)]
        cards: Vec<(String, String)>,
    },
    List,
    Delete { id: String },
    /// Review a deck interactively; ratings are saved only if you finish.
    Review { id: String },
}

#[derive(Debug, Subcommand)]
pub enum PlanCommands {
    Add {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        topic: String,
        #[arg(long, default_value = "recall")]
        method: StudyMethod,
        #[arg(long, default_value = "")]
        notes: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Planned studies for a day and how many are done.
    List {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Toggle { id: String },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommands {
    Show,
    Set {
        /// Focus interval in minutes
        #[arg(long)]
        work: Option<String>,
        /// Break interval in minutes
        #[arg(long = "break")]
        break_minutes: Option<String>,
        #[arg(long)]
        cue: Option<Switch>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

fn parse_card(raw: &str) -> Result<(String, String)> {
    let (front, back) = raw
        .split_once("::")
        .ok_or_else(|| anyhow!("expected \"front::back\", got \"{raw}\""))?;
    let (front, back) = (front.trim(), back.trim());
    if front.is_empty() || back.is_empty() {
        return Err(anyhow!("card front and back must both be filled in"));
    }
    Ok((front.to_string(), back.to_string()))
}

fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|dir| dir.join("studydesk"))
        .ok_or_else(|| anyhow!("no data directory available; pass --data-dir or set {DATA_DIR_ENV}"))
}
