//! Turns the entry form plus the timer's final state into a `StudyEntry`.
//!
//! Nothing is rejected here: an empty subject or a zero-length session still
//! produces a record. The id and `created_at` are assigned at assembly.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    models::{CompletionFlags, StudyEntry, StudyTime},
    timer::TimerState,
};

/// The user-entered half of a study entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntryDraft {
    pub subject: String,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub completion: CompletionFlags,
    #[serde(default)]
    pub questions_count: u32,
}

/// What the timer contributes to an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionTotals {
    pub elapsed: StudyTime,
    pub pomodoros: u32,
}

impl SessionTotals {
    pub fn from_timer(state: &TimerState) -> Self {
        Self {
            elapsed: state.elapsed_breakdown(),
            pomodoros: state.pomodoros_completed,
        }
    }
}

pub fn assemble(
    draft: EntryDraft,
    date: NaiveDate,
    totals: SessionTotals,
    now: DateTime<Utc>,
) -> StudyEntry {
    StudyEntry {
        id: Uuid::new_v4().to_string(),
        date,
        subject: draft.subject,
        content: draft.content,
        completion: draft.completion,
        questions_count: draft.questions_count,
        elapsed: totals.elapsed,
        pomodoro_count: totals.pomodoros,
        created_at: now,
    }
}
