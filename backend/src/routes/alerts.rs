use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::EmployeeId;

// =========================================================
// Legal alerts types + route
// =========================================================

pub const ALERTS: &str = "/schedules/alerts";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsQuery {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

/// Declaration order is the output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    WeeklyHoursExceeded,
    InsufficientRest,
    NightWorkRepetitive,
    MinimumStaffing,
}

impl AlertKind {
    pub fn slug(self) -> &'static str {
        match self {
            Self::WeeklyHoursExceeded => "weekly-hours",
            Self::InsufficientRest => "rest",
            Self::NightWorkRepetitive => "night-work",
            Self::MinimumStaffing => "staffing",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalAlert {
    /// Stable for a given violation: `<kind>-<subject>-<date>`.
    pub id: String,
    pub severity: AlertSeverity,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<EmployeeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub details: serde_json::Value,
}
