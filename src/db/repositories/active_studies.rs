use anyhow::{Context, Result};
use rusqlite::{params, Row};

use crate::{
    db::{
        connection::Database,
        helpers::{format_date, parse_date},
    },
    models::ActiveStudy,
};

fn row_to_active_study(row: &Row) -> Result<ActiveStudy> {
    let study_date: String = row.get("study_date")?;
    let method: String = row.get("method")?;

    Ok(ActiveStudy {
        id: row.get("id")?,
        date: parse_date(&study_date, "study_date")?,
        subject: row.get("subject")?,
        topic: row.get("topic")?,
        method: method.parse()?,
        notes: row.get("notes")?,
        completed: row.get("completed")?,
    })
}

impl Database {
    pub async fn insert_active_study(&self, study: &ActiveStudy) -> Result<()> {
        let record = study.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO active_studies (id, study_date, subject, topic, method, notes, completed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.id,
                    format_date(record.date),
                    record.subject,
                    record.topic,
                    record.method.as_str(),
                    record.notes,
                    record.completed,
                ],
            )
            .with_context(|| format!("failed to insert active study {}", record.id))?;
            Ok(())
        })
        .await
    }

    pub async fn mark_active_study(&self, id: &str, completed: bool) -> Result<bool> {
        let id = id.to_string();
        self.execute(move |conn| {
            let affected = conn
                .execute(
                    "UPDATE active_studies SET completed = ?1 WHERE id = ?2",
                    params![completed, id],
                )
                .context("failed to update active study")?;
            Ok(affected > 0)
        })
        .await
    }

    pub async fn remove_active_study(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.execute(move |conn| {
            let affected = conn
                .execute("DELETE FROM active_studies WHERE id = ?1", params![id])
                .context("failed to delete active study")?;
            Ok(affected > 0)
        })
        .await
    }

    pub async fn get_active_studies(&self) -> Result<Vec<ActiveStudy>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, study_date, subject, topic, method, notes, completed
                 FROM active_studies
                 ORDER BY study_date ASC, rowid ASC",
            )?;
            let mut rows = stmt.query([])?;
            let mut studies = Vec::new();
            while let Some(row) = rows.next()? {
                studies.push(row_to_active_study(row)?);
            }
            Ok(studies)
        })
        .await
    }
}
