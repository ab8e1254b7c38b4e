use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{EmployeeId, ShiftId, SupplementaryDayType, TeamId};
use crate::services::exclusion::ExcludedDate;

// =========================================================
// Rotation planning types + routes
// =========================================================

pub const ROTATION_PREVIEW: &str = "/schedules/rotation/preview";
pub const ROTATION_GENERATE: &str = "/schedules/rotation/generate";

fn default_true() -> bool {
    true
}

/// One employee entering the cycle on `start_date` (first work day).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRotation {
    pub employee_id: EmployeeId,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationPreviewRequest {
    pub work_days: u32,
    pub rest_days: u32,
    pub end_date: NaiveDate,
    pub employees: Vec<EmployeeRotation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRotationRequest {
    pub work_days: u32,
    pub rest_days: u32,
    pub shift_id: ShiftId,
    pub end_date: NaiveDate,
    pub employees: Vec<EmployeeRotation>,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default)]
    pub overwrite_existing: bool,
    #[serde(default = "default_true")]
    pub respect_holidays: bool,
    #[serde(default = "default_true")]
    pub respect_leaves: bool,
    #[serde(default = "default_true")]
    pub respect_recovery_days: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationDay {
    pub date: NaiveDate,
    pub day_of_week: String,
    pub is_work_day: bool,
    /// Set on work days falling on a weekend or holiday.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplementary_type: Option<SupplementaryDayType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRotationPreview {
    pub employee_id: EmployeeId,
    pub matricule: String,
    pub employee_name: String,
    pub start_date: NaiveDate,
    pub schedule: Vec<RotationDay>,
    pub total_work_days: usize,
    pub total_rest_days: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationPreviewResponse {
    pub preview: Vec<EmployeeRotationPreview>,
    pub total_schedules_to_create: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRotationResult {
    pub employee_id: EmployeeId,
    pub matricule: String,
    pub employee_name: String,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub excluded: Vec<ExcludedDate>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationResult {
    pub success: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub details: Vec<EmployeeRotationResult>,
}
