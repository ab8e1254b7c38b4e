use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::schedules::EmployeeSummary;
use crate::models::{DepartmentId, EmployeeId, Replacement, Shift, ShiftId, SiteId, TeamId};

// =========================================================
// Replacement types + routes
// =========================================================

pub const REPLACEMENTS: &str = "/schedules/replacements";
pub const REPLACEMENT_SUGGESTIONS: &str = "/schedules/replacements/suggestions";
pub const REPLACEMENT_APPROVE: &str = "/schedules/replacements/{id}/approve";
pub const REPLACEMENT_REJECT: &str = "/schedules/replacements/{id}/reject";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReplacementRequest {
    pub date: NaiveDate,
    pub original_employee_id: EmployeeId,
    pub replacement_employee_id: EmployeeId,
    pub shift_id: ShiftId,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementView {
    #[serde(flatten)]
    pub replacement: Replacement,
    pub original_employee: Option<EmployeeSummary>,
    pub replacement_employee: Option<EmployeeSummary>,
    pub shift: Option<Shift>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsQuery {
    pub original_employee_id: EmployeeId,
    pub date: NaiveDate,
    pub shift_id: ShiftId,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default)]
    pub site_id: Option<SiteId>,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementSuggestion {
    pub employee: EmployeeSummary,
    /// Hours already planned in the ISO week of the date, plus the shift.
    pub projected_weekly_hours: f64,
    pub exceeds_weekly_limit: bool,
    pub rest_conflict: bool,
    pub warnings: Vec<String>,
}
