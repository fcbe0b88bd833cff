use serde::{Deserialize, Serialize};

/// Hours studied for one subject in the reporting month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubjectHours {
    pub subject: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    /// Current-month hours per subject, largest first.
    pub chart_data: Vec<SubjectHours>,
    pub total_hours: f64,
    /// Sum of `questions_count` over the month's entries, whether or not the
    /// entry has `questions_done` set.
    pub total_questions: u64,
    /// Distinct dates with at least one entry this month.
    pub active_days: usize,
    pub daily_average: f64,
    /// Consecutive study days ending today or yesterday, over all history.
    pub streak: u32,
}

impl Default for ProgressSummary {
    fn default() -> Self {
        Self {
            chart_data: Vec::new(),
            total_hours: 0.0,
            total_questions: 0,
            active_days: 0,
            daily_average: 0.0,
            streak: 0,
        }
    }
}
