use anyhow::{Context, Result};
use rusqlite::{params, Row};

use crate::{
    db::{
        connection::Database,
        helpers::{format_date, parse_date, parse_datetime, to_u32},
    },
    models::{CompletionFlags, StudyEntry, StudyTime},
};

const ENTRY_COLUMNS: &str = "id, entry_date, subject, content, theory_done, questions_done, \
     law_doctrine_done, active_review_done, questions_count, hours, minutes, seconds, \
     pomodoro_count, created_at";

fn row_to_entry(row: &Row) -> Result<StudyEntry> {
    let entry_date: String = row.get("entry_date")?;
    let created_at: String = row.get("created_at")?;

    Ok(StudyEntry {
        id: row.get("id")?,
        date: parse_date(&entry_date, "entry_date")?,
        subject: row.get("subject")?,
        content: row.get("content")?,
        completion: CompletionFlags {
            theory_done: row.get("theory_done")?,
            questions_done: row.get("questions_done")?,
            law_doctrine_done: row.get("law_doctrine_done")?,
            active_review_done: row.get("active_review_done")?,
        },
        questions_count: to_u32(row.get("questions_count")?, "questions_count")?,
        elapsed: StudyTime {
            hours: to_u32(row.get("hours")?, "hours")?,
            minutes: to_u32(row.get("minutes")?, "minutes")?,
            seconds: to_u32(row.get("seconds")?, "seconds")?,
        },
        pomodoro_count: to_u32(row.get("pomodoro_count")?, "pomodoro_count")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    pub async fn insert_entry(&self, entry: &StudyEntry) -> Result<()> {
        let record = entry.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO study_entries (id, entry_date, subject, content, theory_done, questions_done,
                     law_doctrine_done, active_review_done, questions_count, hours, minutes, seconds,
                     pomodoro_count, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    record.id,
                    format_date(record.date),
                    record.subject,
                    record.content,
                    record.completion.theory_done,
                    record.completion.questions_done,
                    record.completion.law_doctrine_done,
                    record.completion.active_review_done,
                    record.questions_count,
                    record.elapsed.hours,
                    record.elapsed.minutes,
                    record.elapsed.seconds,
                    record.pomodoro_count,
                    record.created_at.to_rfc3339(),
                ],
            )
            .with_context(|| format!("failed to insert study entry {}", record.id))?;
            Ok(())
        })
        .await
    }

    pub async fn remove_entry(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.execute(move |conn| {
            let affected = conn
                .execute("DELETE FROM study_entries WHERE id = ?1", params![id])
                .context("failed to delete study entry")?;
            Ok(affected > 0)
        })
        .await
    }

    pub async fn get_entries(&self) -> Result<Vec<StudyEntry>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ENTRY_COLUMNS} FROM study_entries ORDER BY entry_date ASC, created_at ASC"
            ))?;
            let mut rows = stmt.query([])?;
            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                entries.push(row_to_entry(row)?);
            }
            Ok(entries)
        })
        .await
    }
}
