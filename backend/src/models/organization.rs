//! Tenant structure: settings, sites, departments, teams and employees.

use serde::{Deserialize, Serialize};

use super::calendar::DEFAULT_WORKING_DAYS;
use super::{DepartmentId, EmployeeId, ShiftId, SiteId, TeamId, TenantId};

/// Isolated customer account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    #[serde(default)]
    pub settings: TenantSettings,
}

/// Per-tenant planning policy and legal thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TenantSettings {
    /// ISO weekdays (1 = Monday ... 7 = Sunday) worked by default.
    pub working_days: Vec<u32>,
    pub max_weekly_hours: f64,
    pub critical_weekly_hours: f64,
    pub minimum_rest_hours: f64,
    pub critical_rest_hours: f64,
    pub minimum_rest_hours_night_shift: f64,
    pub max_consecutive_nights: u32,
    pub critical_consecutive_nights: u32,
    pub alert_weekly_hours_exceeded: bool,
    pub alert_insufficient_rest: bool,
    pub alert_night_work_repetitive: bool,
    pub alert_minimum_staffing: bool,
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            working_days: DEFAULT_WORKING_DAYS.to_vec(),
            max_weekly_hours: 44.0,
            critical_weekly_hours: 48.0,
            minimum_rest_hours: 11.0,
            critical_rest_hours: 9.0,
            minimum_rest_hours_night_shift: 12.0,
            max_consecutive_nights: 3,
            critical_consecutive_nights: 5,
            alert_weekly_hours_exceeded: true,
            alert_insufficient_rest: true,
            alert_night_work_repetitive: true,
            alert_minimum_staffing: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: SiteId,
    pub tenant_id: TenantId,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    /// Overrides the tenant working days when set.
    #[serde(default)]
    pub working_days: Option<Vec<u32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: DepartmentId,
    pub tenant_id: TenantId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub tenant_id: TenantId,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub rotation_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub tenant_id: TenantId,
    pub matricule: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub site_id: Option<SiteId>,
    #[serde(default)]
    pub department_id: Option<DepartmentId>,
    #[serde(default)]
    pub team_id: Option<TeamId>,
    #[serde(default)]
    pub current_shift_id: Option<ShiftId>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Working days applicable to employees of `site`, falling back to the tenant policy.
pub fn effective_working_days<'a>(settings: &'a TenantSettings, site: Option<&'a Site>) -> &'a [u32] {
    match site.and_then(|s| s.working_days.as_deref()) {
        Some(days) if !days.is_empty() => days,
        _ if !settings.working_days.is_empty() => &settings.working_days,
        _ => &DEFAULT_WORKING_DAYS,
    }
}
