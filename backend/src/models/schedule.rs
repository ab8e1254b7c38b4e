//! Shifts, schedules (one employee-day assignment) and replacements.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::calendar::{self, TimeOfDay};
use super::{EmployeeId, ReplacementId, ScheduleId, ShiftId, TeamId, TenantId, UserId};

/// Reusable working-time template.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: ShiftId,
    pub tenant_id: TenantId,
    pub code: String,
    pub name: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    #[serde(default)]
    pub break_minutes: u32,
    #[serde(default)]
    pub is_night_shift: bool,
}

impl Shift {
    pub fn hours(&self) -> f64 {
        calendar::shift_hours(self.start_time, self.end_time, self.break_minutes)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    #[default]
    Published,
    Draft,
    Cancelled,
    SuspendedByLeave,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: ScheduleId,
    pub tenant_id: TenantId,
    pub employee_id: EmployeeId,
    pub shift_id: ShiftId,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    pub date: NaiveDate,
    #[serde(default)]
    pub custom_start_time: Option<TimeOfDay>,
    #[serde(default)]
    pub custom_end_time: Option<TimeOfDay>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: ScheduleStatus,
    #[serde(default)]
    pub is_replaced: bool,
    #[serde(default)]
    pub replaced_by_id: Option<EmployeeId>,
    #[serde(default)]
    pub replaced_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    /// Fresh published schedule with a new id.
    pub fn new(
        tenant_id: TenantId,
        employee_id: EmployeeId,
        shift_id: ShiftId,
        date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ScheduleId::generate(),
            tenant_id,
            employee_id,
            shift_id,
            team_id: None,
            date,
            custom_start_time: None,
            custom_end_time: None,
            notes: None,
            status: ScheduleStatus::Published,
            is_replaced: false,
            replaced_by_id: None,
            replaced_at: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_team(mut self, team_id: Option<TeamId>) -> Self {
        self.team_id = team_id;
        self
    }

    pub fn with_custom_times(mut self, start: Option<TimeOfDay>, end: Option<TimeOfDay>) -> Self {
        self.custom_start_time = start;
        self.custom_end_time = end;
        self
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn created_by(mut self, user: Option<UserId>) -> Self {
        self.created_by = user;
        self
    }

    /// Cancelled, suspended and replaced schedules no longer count as worked.
    pub fn is_active(&self) -> bool {
        !self.is_replaced
            && !matches!(
                self.status,
                ScheduleStatus::Cancelled | ScheduleStatus::SuspendedByLeave
            )
    }

    pub fn effective_start(&self, shift: &Shift) -> TimeOfDay {
        self.custom_start_time.unwrap_or(shift.start_time)
    }

    pub fn effective_end(&self, shift: &Shift) -> TimeOfDay {
        self.custom_end_time.unwrap_or(shift.end_time)
    }

    /// Worked hours for this day, custom times taking precedence over the shift.
    pub fn worked_hours(&self, shift: &Shift) -> f64 {
        calendar::shift_hours(
            self.effective_start(shift),
            self.effective_end(shift),
            shift.break_minutes,
        )
    }

    pub fn mark_replaced(&mut self, by: EmployeeId, at: DateTime<Utc>) {
        self.is_replaced = true;
        self.replaced_by_id = Some(by);
        self.replaced_at = Some(at);
        self.updated_at = at;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplacementStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl std::str::FromStr for ReplacementStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(format!("Statut de remplacement invalide: {}", other)),
        }
    }
}

/// Request for another employee to cover a shift on a given day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replacement {
    pub id: ReplacementId,
    pub tenant_id: TenantId,
    pub date: NaiveDate,
    pub original_employee_id: EmployeeId,
    pub replacement_employee_id: EmployeeId,
    pub shift_id: ShiftId,
    #[serde(default)]
    pub original_schedule_id: Option<ScheduleId>,
    #[serde(default)]
    pub replacement_schedule_id: Option<ScheduleId>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub status: ReplacementStatus,
    #[serde(default)]
    pub requested_by: Option<UserId>,
    #[serde(default)]
    pub approved_by: Option<UserId>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
