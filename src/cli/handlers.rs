use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate, Utc};
use log::info;
use serde::Serialize;
use serde_json::json;

use crate::{
    audio::{AudioCue, CuePlayer, SilentCue},
    db::Database,
    desk::StudyDesk,
    entries::SessionTotals,
    models::{CardDraft, DeckDraft, StudyTime},
    planner::ActiveStudyDraft,
    settings::{CueSettings, SettingsStore},
    timer::parse_minutes,
};

use super::{
    interactive, resolve_data_dir, Cli, Commands, DeckCommands, PlanCommands, SettingsCommands,
    Switch,
};

const DB_FILE_NAME: &str = "studydesk.sqlite3";
const SETTINGS_FILE_NAME: &str = "settings.json";

struct AppContext {
    desk: StudyDesk,
    settings: SettingsStore,
}

impl AppContext {
    fn init(cli: &Cli) -> Result<Self> {
        let data_dir = resolve_data_dir(cli.data_dir.clone())?;
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let database = Database::new(data_dir.join(DB_FILE_NAME))?;
        let settings = SettingsStore::new(data_dir.join(SETTINGS_FILE_NAME))?;

        Ok(Self {
            desk: StudyDesk::new(Arc::new(database)),
            settings,
        })
    }

    fn cue(&self) -> Arc<dyn CuePlayer> {
        if self.settings.cue().enabled {
            Arc::new(AudioCue::new())
        } else {
            Arc::new(SilentCue)
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run(cli: Cli) -> Result<()> {
    let ctx = AppContext::init(&cli)?;

    match cli.command {
        Commands::Focus { entry, pomodoros } => {
            let date = entry.date.unwrap_or_else(today);
            let saved = interactive::focus(
                &ctx.desk,
                ctx.settings.timer(),
                pomodoros,
                ctx.cue(),
                entry.draft(),
                date,
            )
            .await?;
            if let Some(saved) = saved {
                print_json(&saved)?;
            }
        }
        Commands::Log {
            entry,
            hours,
            minutes,
            seconds,
        } => {
            let totals = SessionTotals {
                elapsed: StudyTime::new(hours, minutes, seconds),
                pomodoros: 0,
            };
            let date = entry.date.unwrap_or_else(today);
            let saved = ctx
                .desk
                .record_entry(entry.draft(), date, totals, Utc::now())
                .await?;
            print_json(&saved)?;
        }
        Commands::Entries { date } => {
            let entries = match date {
                Some(date) => ctx.desk.entries_on(date).await?,
                None => ctx.desk.entries().await?,
            };
            print_json(&entries)?;
        }
        Commands::DeleteEntry { id } => {
            let removed = ctx.desk.delete_entry(&id).await?;
            print_json(&json!({ "id": id, "removed": removed }))?;
        }
        Commands::Progress { today: reference } => {
            let summary = ctx.desk.progress(reference.unwrap_or_else(today)).await?;
            print_json(&summary)?;
        }
        Commands::Calendar { year, month } => {
            let now = today();
            let year = year.unwrap_or(now.year());
            let month = month.unwrap_or(now.month());
            let days = ctx.desk.month_markers(year, month).await?;
            print_json(&json!({ "year": year, "month": month, "days": days }))?;
        }
        Commands::Deck { action } => deck(&ctx, action).await?,
        Commands::Plan { action } => plan(&ctx, action).await?,
        Commands::Settings { action } => settings(&ctx, action)?,
    }

    Ok(())
}

async fn deck(ctx: &AppContext, action: DeckCommands) -> Result<()> {
    match action {
        DeckCommands::Create {
            subject,
            topic,
            cards,
        } => {
            let draft = DeckDraft {
                subject,
                topic,
                cards: cards
                    .into_iter()
                    .map(|(front, back)| CardDraft { front, back })
                    .collect(),
            };
            let deck = ctx.desk.create_deck(draft, Utc::now()).await?;
            print_json(&deck)?;
        }
        DeckCommands::List => print_json(&ctx.desk.decks().await?)?,
        DeckCommands::Delete { id } => {
            let removed = ctx.desk.delete_deck(&id).await?;
            print_json(&json!({ "id": id, "removed": removed }))?;
        }
        DeckCommands::Review { id } => {
            let deck = ctx.desk.deck(&id).await?;
            if let Some(outcome) = interactive::review(&deck).await? {
                let updated = ctx.desk.commit_review(outcome).await?;
                print_json(&updated)?;
            }
        }
    }
    Ok(())
}

async fn plan(ctx: &AppContext, action: PlanCommands) -> Result<()> {
    match action {
        PlanCommands::Add {
            subject,
            topic,
            method,
            notes,
            date,
        } => {
            let draft = ActiveStudyDraft {
                subject,
                topic,
                method,
                notes,
            };
            let study = ctx
                .desk
                .plan_study(draft, date.unwrap_or_else(today))
                .await?;
            print_json(&study)?;
        }
        PlanCommands::List { date } => {
            let date = date.unwrap_or_else(today);
            let (studies, progress) = ctx.desk.day_plan(date).await?;
            print_json(&json!({
                "date": date,
                "studies": studies,
                "completed": progress.completed,
                "total": progress.total,
                "ratio": progress.ratio(),
            }))?;
        }
        PlanCommands::Toggle { id } => {
            let completed = ctx.desk.toggle_study(&id).await?;
            print_json(&json!({ "id": id, "completed": completed }))?;
        }
        PlanCommands::Delete { id } => {
            let removed = ctx.desk.delete_study(&id).await?;
            print_json(&json!({ "id": id, "removed": removed }))?;
        }
    }
    Ok(())
}

fn settings(ctx: &AppContext, action: SettingsCommands) -> Result<()> {
    match action {
        SettingsCommands::Show => {}
        SettingsCommands::Set {
            work,
            break_minutes,
            cue,
        } => {
            if work.is_some() || break_minutes.is_some() {
                let current = ctx.settings.timer();
                let work = work
                    .as_deref()
                    .map(parse_minutes)
                    .unwrap_or(current.work_minutes);
                let brk = break_minutes
                    .as_deref()
                    .map(parse_minutes)
                    .unwrap_or(current.break_minutes);
                let updated = ctx.settings.update_timer(work, brk)?;
                info!(
                    "Timer set to {}m focus / {}m break",
                    updated.work_minutes, updated.break_minutes
                );
            }
            if let Some(cue) = cue {
                ctx.settings.update_cue(CueSettings {
                    enabled: cue == Switch::On,
                })?;
            }
        }
    }

    print_json(&json!({
        "timer": ctx.settings.timer(),
        "cue": ctx.settings.cue(),
    }))
}
