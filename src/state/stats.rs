//! Daily productivity statistics

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Daily-scoped counters shown on the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Calendar day the counters belong to, e.g. `Mon Oct 19 2026`
    pub date: String,
    pub tasks_completed_today: u32,
    #[serde(alias = "totalFocusTime")]
    pub total_focus_time_minutes: u32,
}

impl Stats {
    /// Zeroed counters for `date`
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            tasks_completed_today: 0,
            total_focus_time_minutes: 0,
        }
    }

    /// Keep stored stats only if they belong to `today`
    pub fn rollover(stored: Option<Stats>, today: &str) -> Self {
        match stored {
            Some(stats) if stats.date == today => stats,
            Some(stats) => {
                tracing::info!(
                    "Stats from {} are stale, starting a fresh day {}",
                    stats.date,
                    today
                );
                Self::new(today)
            }
            None => Self::new(today),
        }
    }

    pub fn record_focus_minutes(&mut self, minutes: u32) {
        self.total_focus_time_minutes = self.total_focus_time_minutes.saturating_add(minutes);
    }

    pub fn record_task_completed(&mut self) {
        self.tasks_completed_today = self.tasks_completed_today.saturating_add(1);
    }

    /// Accumulated focus time as `Xh Ym`
    pub fn focus_time_display(&self) -> String {
        format_focus_time(self.total_focus_time_minutes)
    }
}

/// Render the local calendar day in the stored `date` format
pub fn today() -> String {
    date_key(Local::now().date_naive())
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// Render minutes as `Xh Ym`
pub fn format_focus_time(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}
