//! Active-study planning: recall objectives scheduled for a day.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ActiveStudy, StudyMethod};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveStudyDraft {
    pub subject: String,
    pub topic: String,
    #[serde(default)]
    pub method: StudyMethod,
    #[serde(default)]
    pub notes: String,
}

impl ActiveStudyDraft {
    pub fn build(self, date: NaiveDate) -> Result<ActiveStudy> {
        let subject = self.subject.trim();
        let topic = self.topic.trim();
        if subject.is_empty() {
            bail!("an active study needs a subject");
        }
        if topic.is_empty() {
            bail!("an active study needs a topic");
        }

        Ok(ActiveStudy {
            id: Uuid::new_v4().to_string(),
            date,
            subject: subject.to_string(),
            topic: topic.to_string(),
            method: self.method,
            notes: self.notes,
            completed: false,
        })
    }
}

/// Flip completion and return the new value.
pub fn toggle(study: &mut ActiveStudy) -> bool {
    study.completed = !study.completed;
    study.completed
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DayPlanProgress {
    pub completed: usize,
    pub total: usize,
}

impl DayPlanProgress {
    pub fn for_date(studies: &[ActiveStudy], date: NaiveDate) -> Self {
        studies
            .iter()
            .filter(|s| s.date == date)
            .fold(Self::default(), |mut acc, s| {
                acc.total += 1;
                if s.completed {
                    acc.completed += 1;
                }
                acc
            })
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}
