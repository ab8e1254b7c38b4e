use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{
    DepartmentId, Employee, EmployeeId, Leave, Replacement, Schedule, ScheduleId, ScheduleStatus,
    Shift, ShiftId, SiteId, TeamId,
};
use crate::services::exclusion::ExcludedDate;

// =========================================================
// Schedule CRUD types + routes
// =========================================================

pub const SCHEDULES: &str = "/schedules";
pub const SCHEDULES_BULK: &str = "/schedules/bulk";
pub const SCHEDULE_BY_ID: &str = "/schedules/{id}";
pub const WEEK_VIEW: &str = "/schedules/week/{date}";
pub const MONTH_VIEW: &str = "/schedules/month/{date}";

fn default_true() -> bool {
    true
}

/// Assign a shift to one employee over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    pub employee_id: EmployeeId,
    pub shift_id: ShiftId,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    pub date_debut: NaiveDate,
    /// Defaults to `date_debut` (single day).
    #[serde(default)]
    pub date_fin: Option<NaiveDate>,
    #[serde(default)]
    pub custom_start_time: Option<String>,
    #[serde(default)]
    pub custom_end_time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "default_true")]
    pub exclude_non_working_days: bool,
    #[serde(default = "default_true")]
    pub exclude_holidays: bool,
    #[serde(default = "default_true")]
    pub respect_leaves: bool,
    #[serde(default = "default_true")]
    pub respect_recovery_days: bool,
}

impl CreateScheduleRequest {
    pub fn new(
        employee_id: EmployeeId,
        shift_id: ShiftId,
        date_debut: NaiveDate,
        date_fin: Option<NaiveDate>,
    ) -> Self {
        Self {
            employee_id,
            shift_id,
            team_id: None,
            date_debut,
            date_fin,
            custom_start_time: None,
            custom_end_time: None,
            notes: None,
            exclude_non_working_days: true,
            exclude_holidays: true,
            respect_leaves: true,
            respect_recovery_days: true,
        }
    }

    pub fn end_date(&self) -> NaiveDate {
        self.date_fin.unwrap_or(self.date_debut)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleResponse {
    pub count: usize,
    pub created: usize,
    /// Dates that already held a schedule.
    pub skipped: usize,
    /// Dates removed by the exclusion rules, with the rule that fired.
    pub excluded: Vec<ExcludedDate>,
    pub date_range: DateRange,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkScheduleRequest {
    pub schedules: Vec<CreateScheduleRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateResponse {
    pub count: usize,
    pub total: usize,
    pub skipped: usize,
    pub excluded: Vec<ExcludedDate>,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleRequest {
    #[serde(default)]
    pub shift_id: Option<ShiftId>,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default, alias = "dateDebut")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub custom_start_time: Option<String>,
    #[serde(default)]
    pub custom_end_time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<ScheduleStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDeleteRequest {
    #[serde(default)]
    pub ids: Vec<ScheduleId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDeleteResponse {
    pub count: usize,
    pub deleted: usize,
}

/// Query string of `GET /v1/schedules`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleQuery {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub employee_id: Option<EmployeeId>,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default)]
    pub shift_id: Option<ShiftId>,
    #[serde(default)]
    pub site_id: Option<SiteId>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Team/site narrowing for the week and month views.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewFilter {
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default)]
    pub site_id: Option<SiteId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    pub id: EmployeeId,
    pub matricule: String,
    pub first_name: String,
    pub last_name: String,
    pub position: Option<String>,
    pub site_id: Option<SiteId>,
    pub department_id: Option<DepartmentId>,
    pub team_id: Option<TeamId>,
}

impl From<&Employee> for EmployeeSummary {
    fn from(e: &Employee) -> Self {
        Self {
            id: e.id,
            matricule: e.matricule.clone(),
            first_name: e.first_name.clone(),
            last_name: e.last_name.clone(),
            position: e.position.clone(),
            site_id: e.site_id,
            department_id: e.department_id,
            team_id: e.team_id,
        }
    }
}

/// A schedule joined with its employee and shift.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleView {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub employee: Option<EmployeeSummary>,
    pub shift: Option<Shift>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleListResponse {
    pub data: Vec<ScheduleView>,
    pub meta: PageMeta,
}

/// Week or month planning window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningView {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub schedules: Vec<ScheduleView>,
    pub leaves: Vec<Leave>,
    pub replacements: Vec<Replacement>,
}
