//! Line-driven terminal loops for the focus timer and deck review.
//!
//! Prompts and status lines go to stderr so stdout only carries the JSON
//! result.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use log::warn;
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::broadcast::error::RecvError,
};

use crate::{
    audio::CuePlayer,
    desk::StudyDesk,
    entries::{EntryDraft, SessionTotals},
    models::{FlashcardDeck, StudyEntry},
    review::{Advance, RevealedCard, ReviewOutcome, ReviewRating, ReviewSession},
    settings::TimerSettings,
    timer::{TimerController, TimerEvent, TimerMode, TimerSnapshot, TimerStatus},
};

type StdinLines = Lines<BufReader<Stdin>>;

fn stdin_lines() -> StdinLines {
    BufReader::new(tokio::io::stdin()).lines()
}

fn status_line(snapshot: &TimerSnapshot) -> String {
    let state = &snapshot.state;
    let status = match state.status {
        TimerStatus::Running => "running",
        TimerStatus::Idle => "paused",
    };
    format!(
        "[{}] {} {}  focus {}  pomodoros {}",
        state.mode.as_str(),
        snapshot.countdown,
        status,
        snapshot.elapsed,
        state.pomodoros_completed
    )
}

/// Returns the saved entry, or `None` when the session was discarded.
pub async fn focus(
    desk: &StudyDesk,
    settings: TimerSettings,
    pomodoros: u32,
    cue: Arc<dyn CuePlayer>,
    draft: EntryDraft,
    date: NaiveDate,
) -> Result<Option<StudyEntry>> {
    let timer = TimerController::from_settings(&settings, pomodoros, cue);
    let mut events = timer.subscribe();
    let mut lines = stdin_lines();

    eprintln!("s start/pause, r reset, w focus mode, b break mode, q save & quit, x discard");
    eprintln!("{}", status_line(&timer.snapshot().await));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read from stdin")? else {
                    warn!("stdin closed; discarding focus session");
                    timer.finish().await;
                    return Ok(None);
                };

                let snapshot = match line.trim() {
                    "s" => timer.toggle().await,
                    "r" => timer.reset().await,
                    "w" => timer.switch_mode(TimerMode::Work).await,
                    "b" => timer.switch_mode(TimerMode::Break).await,
                    "q" => {
                        let final_state = timer.finish().await;
                        let entry = desk
                            .record_entry(
                                draft.clone(),
                                date,
                                SessionTotals::from_timer(&final_state),
                                Utc::now(),
                            )
                            .await?;
                        return Ok(Some(entry));
                    }
                    "x" => {
                        timer.finish().await;
                        eprintln!("Session discarded");
                        return Ok(None);
                    }
                    "" => timer.snapshot().await,
                    other => {
                        eprintln!("Unknown command '{other}'");
                        continue;
                    }
                };
                eprintln!("{}", status_line(&snapshot));
            }
            event = events.recv() => match event {
                Ok(TimerEvent::Heartbeat(snapshot)) => eprintln!("{}", status_line(&snapshot)),
                Ok(TimerEvent::IntervalCompleted { finished, snapshot }) => {
                    let next = match finished {
                        TimerMode::Work => "Focus interval done, take a break",
                        TimerMode::Break => "Break over, back to focus",
                    };
                    eprintln!("{next}. Press s to start.");
                    eprintln!("{}", status_line(&snapshot));
                }
                Ok(TimerEvent::StateChanged(_)) => {}
                Err(RecvError::Lagged(skipped)) => warn!("Timer display skipped {skipped} events"),
                Err(RecvError::Closed) => {
                    warn!("Timer event channel closed");
                    return Ok(None);
                }
            },
        }
    }
}

enum Reply {
    Rate(ReviewRating),
    Skip,
    Flip,
    Quit,
}

fn parse_reply(raw: &str) -> Option<Reply> {
    match raw.trim() {
        "" | "f" => Some(Reply::Flip),
        "n" | "s" => Some(Reply::Skip),
        "x" | "q" => Some(Reply::Quit),
        other => other
            .parse::<u8>()
            .ok()
            .and_then(ReviewRating::from_level)
            .map(Reply::Rate),
    }
}

fn show_back(revealed: &RevealedCard) {
    let card = revealed.card();
    eprintln!("A: {}  (last rated: {})", card.back, card.level.label());
}

fn rating_help() -> String {
    [ReviewRating::Hard, ReviewRating::Medium, ReviewRating::Easy]
        .iter()
        .map(|rating| {
            let level = rating.level();
            format!("{} {}", level.as_u8(), level.label().to_lowercase())
        })
        .collect::<Vec<_>>()
        .join(" / ")
}

async fn next_reply(lines: &mut StdinLines) -> Result<Reply> {
    loop {
        let Some(line) = lines.next_line().await.context("failed to read from stdin")? else {
            return Ok(Reply::Quit);
        };
        match parse_reply(&line) {
            Some(reply) => return Ok(reply),
            None => eprintln!("Enter flips, {} rates, n skips, x quits", rating_help()),
        }
    }
}

/// Walk the deck until the last card is passed. Quitting early returns
/// `None` and nothing is saved.
pub async fn review(deck: &FlashcardDeck) -> Result<Option<ReviewOutcome>> {
    let Some(mut session) = ReviewSession::start(deck) else {
        eprintln!("Deck {} has no cards to review", deck.id);
        return Ok(None);
    };
    let mut lines = stdin_lines();

    eprintln!("{} / {}", deck.subject, deck.topic);
    eprintln!(
        "Enter flips, {} after flipping, n skips, x quits",
        rating_help()
    );

    loop {
        let (index, total) = session.position();
        eprintln!("\nCard {index}/{total}\nQ: {}", session.card().front);

        let step = match next_reply(&mut lines).await? {
            Reply::Quit => return Ok(None),
            Reply::Skip => session.advance(),
            Reply::Flip | Reply::Rate(_) => {
                let mut revealed = session.flip();
                show_back(&revealed);
                loop {
                    match next_reply(&mut lines).await? {
                        Reply::Quit => return Ok(None),
                        Reply::Skip => break revealed.advance(),
                        Reply::Rate(rating) => break revealed.rate(rating, Utc::now()),
                        Reply::Flip => {
                            let hidden = revealed.flip();
                            eprintln!("Q: {}", hidden.card().front);
                            revealed = hidden.flip();
                            show_back(&revealed);
                        }
                    }
                }
            }
        };

        match step {
            Advance::Next(next) => session = next,
            Advance::Completed(outcome) => {
                eprintln!("Review complete");
                return Ok(Some(outcome));
            }
        }
    }
}
