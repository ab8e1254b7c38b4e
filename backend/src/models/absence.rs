//! Holidays, leaves and recovery days: everything that removes a date from planning.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{EmployeeId, HolidayId, LeaveId, RecoveryDayId, TenantId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub id: HolidayId,
    pub tenant_id: TenantId,
    pub date: NaiveDate,
    pub name: String,
    /// Recurring holidays repeat on the same month/day every year.
    #[serde(default)]
    pub is_recurring: bool,
}

impl Holiday {
    pub fn new(tenant_id: TenantId, date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            id: HolidayId::generate(),
            tenant_id,
            date,
            name: name.into(),
            is_recurring: false,
        }
    }

    pub fn recurring(mut self) -> Self {
        self.is_recurring = true;
        self
    }

    pub fn matches(&self, date: NaiveDate) -> bool {
        if self.is_recurring {
            self.date.month() == date.month() && self.date.day() == date.day()
        } else {
            self.date == date
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveStatus {
    Pending,
    ManagerApproved,
    Approved,
    HrApproved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    /// Only fully approved leaves take the employee off the planning.
    pub fn blocks_planning(self) -> bool {
        matches!(self, Self::Approved | Self::HrApproved)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leave {
    pub id: LeaveId,
    pub tenant_id: TenantId,
    pub employee_id: EmployeeId,
    #[serde(default)]
    pub leave_type: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
}

impl Leave {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecoveryDayStatus {
    Pending,
    Approved,
    Used,
    Cancelled,
}

impl RecoveryDayStatus {
    pub fn blocks_planning(self) -> bool {
        matches!(self, Self::Approved | Self::Used)
    }
}

/// Compensatory rest granted in exchange for overtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryDay {
    pub id: RecoveryDayId,
    pub tenant_id: TenantId,
    pub employee_id: EmployeeId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: RecoveryDayStatus,
}

impl RecoveryDay {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupplementaryDayType {
    WeekendSaturday,
    WeekendSunday,
    Holiday,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_recurring_holiday_matches_other_years() {
        let tenant = TenantId::generate();
        let fixed = Holiday::new(tenant, d(2025, 11, 18), "Fête de l'Indépendance");
        let recurring = fixed.clone().recurring();

        assert!(fixed.matches(d(2025, 11, 18)));
        assert!(!fixed.matches(d(2026, 11, 18)));
        assert!(recurring.matches(d(2026, 11, 18)));
        assert!(!recurring.matches(d(2026, 11, 19)));
    }

    #[test]
    fn test_leave_status_blocking() {
        assert!(LeaveStatus::Approved.blocks_planning());
        assert!(LeaveStatus::HrApproved.blocks_planning());
        assert!(!LeaveStatus::ManagerApproved.blocks_planning());
        assert!(!LeaveStatus::Pending.blocks_planning());
        assert!(!LeaveStatus::Rejected.blocks_planning());
    }

    #[test]
    fn test_leave_status_wire_format() {
        let json = serde_json::to_string(&LeaveStatus::ManagerApproved).unwrap();
        assert_eq!(json, "\"MANAGER_APPROVED\"");
    }

    #[test]
    fn test_leave_covers_is_inclusive() {
        let leave = Leave {
            id: LeaveId::generate(),
            tenant_id: TenantId::generate(),
            employee_id: EmployeeId::generate(),
            leave_type: None,
            start_date: d(2026, 2, 2),
            end_date: d(2026, 2, 4),
            status: LeaveStatus::Approved,
        };
        assert!(leave.covers(d(2026, 2, 2)));
        assert!(leave.covers(d(2026, 2, 4)));
        assert!(!leave.covers(d(2026, 2, 5)));
        assert!(leave.overlaps(d(2026, 2, 4), d(2026, 2, 10)));
        assert!(!leave.overlaps(d(2026, 2, 5), d(2026, 2, 10)));
    }
}
