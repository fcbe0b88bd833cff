//! Planned active-recall objectives.

use std::str::FromStr;

use anyhow::{anyhow, Error};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StudyMethod {
    #[default]
    Recall,
    Explanation,
    Mindmap,
    Other,
}

impl StudyMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudyMethod::Recall => "recall",
            StudyMethod::Explanation => "explanation",
            StudyMethod::Mindmap => "mindmap",
            StudyMethod::Other => "other",
        }
    }
}

impl FromStr for StudyMethod {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "recall" => Ok(StudyMethod::Recall),
            "explanation" => Ok(StudyMethod::Explanation),
            "mindmap" => Ok(StudyMethod::Mindmap),
            "other" => Ok(StudyMethod::Other),
            other => Err(anyhow!("unknown study method '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveStudy {
    pub id: String,
    pub date: NaiveDate,
    pub subject: String,
    pub topic: String,
    pub method: StudyMethod,
    #[serde(default)]
    pub notes: String,
    pub completed: bool,
}
