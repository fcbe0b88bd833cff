//! Progress analytics over the full entry history.
//!
//! Everything here is a pure function of the entries plus an injected
//! `today`; nothing reads the system clock.

mod types;

pub use types::{ProgressSummary, SubjectHours};

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};

use crate::models::StudyEntry;

pub fn summarize(entries: &[StudyEntry], today: NaiveDate) -> ProgressSummary {
    let mut chart_data: Vec<SubjectHours> = Vec::new();
    let mut subject_index: HashMap<&str, usize> = HashMap::new();
    let mut total_hours = 0.0;
    let mut total_questions: u64 = 0;
    let mut active_days: HashSet<NaiveDate> = HashSet::new();

    for entry in entries.iter().filter(|e| same_month(e.date, today)) {
        let hours = entry.elapsed.fractional_hours();

        match subject_index.get(entry.subject.as_str()) {
            Some(&idx) => chart_data[idx].hours += hours,
            None => {
                subject_index.insert(entry.subject.as_str(), chart_data.len());
                chart_data.push(SubjectHours {
                    subject: entry.subject.clone(),
                    hours,
                });
            }
        }

        total_hours += hours;
        total_questions += u64::from(entry.questions_count);
        active_days.insert(entry.date);
    }

    // Stable sort: equal totals keep first-seen order.
    chart_data.sort_by(|a, b| b.hours.total_cmp(&a.hours));

    let daily_average = if active_days.is_empty() {
        0.0
    } else {
        total_hours / active_days.len() as f64
    };

    ProgressSummary {
        chart_data,
        total_hours,
        total_questions,
        active_days: active_days.len(),
        daily_average,
        streak: current_streak(entries, today),
    }
}

/// Consecutive calendar days with at least one entry, counted back from the
/// most recent entry date. The chain is broken (streak 0) when the most
/// recent entry is older than yesterday.
pub fn current_streak(entries: &[StudyEntry], today: NaiveDate) -> u32 {
    let dates: BTreeSet<NaiveDate> = entries.iter().map(|e| e.date).collect();
    let mut newest_first = dates.iter().rev();

    let Some(&most_recent) = newest_first.next() else {
        return 0;
    };
    if (today - most_recent).num_days() > 1 {
        return 0;
    }

    let mut streak = 1;
    let mut previous = most_recent;
    for &date in newest_first {
        if (previous - date).num_days() > 1 {
            break;
        }
        streak += 1;
        previous = date;
    }
    streak
}

/// Entries logged on `date`, in their original order.
pub fn entries_on(entries: &[StudyEntry], date: NaiveDate) -> Vec<&StudyEntry> {
    entries.iter().filter(|e| e.date == date).collect()
}

/// Days of `year`/`month` that have at least one entry, ascending.
pub fn month_markers(entries: &[StudyEntry], year: i32, month: u32) -> Vec<u32> {
    entries
        .iter()
        .filter(|e| e.date.year() == year && e.date.month() == month)
        .map(|e| e.date.day())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn same_month(date: NaiveDate, reference: NaiveDate) -> bool {
    date.year() == reference.year() && date.month() == reference.month()
}
