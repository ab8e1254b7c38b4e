//! Legal alerts over planned schedules.
//!
//! Four detectors run over the active schedules of a window, each behind its
//! tenant toggle:
//!
//! - weekly hours per employee and ISO week
//! - rest between consecutive services of an employee
//! - longest run of consecutive night shifts per employee
//! - days where a site has nobody planned
//!
//! Thresholds come from [`TenantSettings`]. Alert ids are derived from the
//! violation itself, so running the scan twice yields the same ids.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};
use serde_json::json;
use tracing::info;

use super::{validate_range, ServiceResult};
use crate::config::SchedulingConfig;
use crate::db::repository::{FullRepository, ScheduleFilter};
use crate::models::calendar;
use crate::models::{
    effective_working_days, Employee, EmployeeId, Holiday, Schedule, Shift, Site, TenantId,
    TenantSettings,
};
use crate::routes::alerts::{AlertKind, AlertSeverity, AlertsQuery, LegalAlert};

/// One active schedule with its shift and employee resolved.
#[derive(Debug, Clone, Copy)]
pub struct WorkedShift<'a> {
    pub schedule: &'a Schedule,
    pub shift: &'a Shift,
    pub employee: &'a Employee,
}

impl WorkedShift<'_> {
    fn hours(&self) -> f64 {
        self.schedule.worked_hours(self.shift)
    }

    fn interval(&self) -> (chrono::NaiveDateTime, chrono::NaiveDateTime) {
        calendar::shift_interval(
            self.schedule.date,
            self.schedule.effective_start(self.shift),
            self.schedule.effective_end(self.shift),
        )
    }
}

fn alert_id(kind: AlertKind, subject: impl std::fmt::Display, date: NaiveDate) -> String {
    format!("{}-{}-{}", kind.slug(), subject, date)
}

fn employee_alert(
    kind: AlertKind,
    severity: AlertSeverity,
    employee: &Employee,
    date: NaiveDate,
    message: String,
    details: serde_json::Value,
) -> LegalAlert {
    LegalAlert {
        id: alert_id(kind, employee.id, date),
        severity,
        kind,
        message,
        employee_id: Some(employee.id),
        employee_name: Some(employee.full_name()),
        date: Some(date),
        details,
    }
}

/// Window scanned when the query leaves a bound out: the ISO week of `today`
/// for a missing start, six days after the start for a missing end.
pub fn resolve_window(query: &AlertsQuery, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = query.start_date.unwrap_or_else(|| calendar::week_start(today));
    let end = query
        .end_date
        .unwrap_or_else(|| start + Duration::days(6));
    (start, end)
}

/// Group worked shifts per employee, each list sorted by date.
fn by_employee<'a>(worked: &[WorkedShift<'a>]) -> BTreeMap<EmployeeId, Vec<WorkedShift<'a>>> {
    let mut grouped: BTreeMap<EmployeeId, Vec<WorkedShift<'a>>> = BTreeMap::new();
    for w in worked {
        grouped.entry(w.employee.id).or_default().push(*w);
    }
    for list in grouped.values_mut() {
        list.sort_by_key(|w| w.schedule.date);
    }
    grouped
}

pub fn weekly_hours_alerts(worked: &[WorkedShift<'_>], settings: &TenantSettings) -> Vec<LegalAlert> {
    let mut totals: BTreeMap<(EmployeeId, NaiveDate), (f64, &Employee)> = BTreeMap::new();
    for w in worked {
        let key = (w.employee.id, calendar::week_start(w.schedule.date));
        totals.entry(key).or_insert((0.0, w.employee)).0 += w.hours();
    }

    totals
        .into_iter()
        .filter_map(|((_, week), (hours, employee))| {
            let severity = if hours > settings.critical_weekly_hours {
                AlertSeverity::Critical
            } else if hours > settings.max_weekly_hours {
                AlertSeverity::Warning
            } else {
                return None;
            };
            Some(employee_alert(
                AlertKind::WeeklyHoursExceeded,
                severity,
                employee,
                week,
                format!(
                    "Heures hebdomadaires dépassées: {:.1}h (limite: {}h)",
                    hours, settings.max_weekly_hours
                ),
                json!({
                    "weekStart": week,
                    "hours": hours,
                    "limit": settings.max_weekly_hours,
                    "criticalLimit": settings.critical_weekly_hours,
                }),
            ))
        })
        .collect()
}

pub fn rest_alerts(worked: &[WorkedShift<'_>], settings: &TenantSettings) -> Vec<LegalAlert> {
    let mut alerts = Vec::new();
    for list in by_employee(worked).values() {
        for pair in list.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            let (_, prev_end) = prev.interval();
            let (next_start, _) = next.interval();
            let rest = calendar::hours_between(prev_end, next_start);
            let minimum = if prev.shift.is_night_shift {
                settings.minimum_rest_hours_night_shift
            } else {
                settings.minimum_rest_hours
            };

            let severity = if rest < settings.critical_rest_hours {
                AlertSeverity::Critical
            } else if rest < minimum {
                AlertSeverity::Warning
            } else {
                continue;
            };
            alerts.push(employee_alert(
                AlertKind::InsufficientRest,
                severity,
                next.employee,
                next.schedule.date,
                format!(
                    "Repos insuffisant: {:.1}h entre deux services (minimum: {}h)",
                    rest, minimum
                ),
                json!({
                    "previousDate": prev.schedule.date,
                    "restHours": rest,
                    "minimum": minimum,
                    "afterNightShift": prev.shift.is_night_shift,
                }),
            ));
        }
    }
    alerts
}

pub fn night_work_alerts(worked: &[WorkedShift<'_>], settings: &TenantSettings) -> Vec<LegalAlert> {
    let mut alerts = Vec::new();
    for list in by_employee(worked).values() {
        let nights: Vec<NaiveDate> = list
            .iter()
            .filter(|w| w.shift.is_night_shift)
            .map(|w| w.schedule.date)
            .collect();
        let Some((run_start, run_len)) = longest_run(&nights) else {
            continue;
        };

        let severity = if run_len > settings.critical_consecutive_nights as usize {
            AlertSeverity::Critical
        } else if run_len > settings.max_consecutive_nights as usize {
            AlertSeverity::Warning
        } else {
            continue;
        };
        alerts.push(employee_alert(
            AlertKind::NightWorkRepetitive,
            severity,
            list[0].employee,
            run_start,
            format!(
                "Travail de nuit répétitif: {} nuits consécutives (limite: {})",
                run_len, settings.max_consecutive_nights
            ),
            json!({
                "consecutiveNights": run_len,
                "limit": settings.max_consecutive_nights,
                "criticalLimit": settings.critical_consecutive_nights,
            }),
        ));
    }
    alerts
}

/// First longest run of consecutive days in sorted `dates`, as (start, length).
fn longest_run(dates: &[NaiveDate]) -> Option<(NaiveDate, usize)> {
    let mut best: Option<(NaiveDate, usize)> = None;
    let mut current: Option<(NaiveDate, usize)> = None;
    let mut previous: Option<NaiveDate> = None;

    for &date in dates {
        current = match (current, previous) {
            (Some((start, len)), Some(prev)) if date - prev == Duration::days(1) => {
                Some((start, len + 1))
            }
            (Some(run), Some(prev)) if date == prev => Some(run),
            _ => Some((date, 1)),
        };
        if let Some(run) = current {
            if best.is_none_or(|(_, len)| run.1 > len) {
                best = Some(run);
            }
        }
        previous = Some(date);
    }
    best
}

pub fn staffing_alerts(
    worked: &[WorkedShift<'_>],
    sites: &[Site],
    holidays: &[Holiday],
    settings: &TenantSettings,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<LegalAlert> {
    let mut alerts = Vec::new();
    for site in sites {
        let working_days = effective_working_days(settings, Some(site));
        for date in calendar::date_range(start, end) {
            if !calendar::is_working_day(date, working_days)
                || holidays.iter().any(|h| h.matches(date))
            {
                continue;
            }
            let staffed = worked
                .iter()
                .any(|w| w.schedule.date == date && w.employee.site_id == Some(site.id));
            if staffed {
                continue;
            }
            alerts.push(LegalAlert {
                id: alert_id(AlertKind::MinimumStaffing, site.id, date),
                severity: AlertSeverity::Warning,
                kind: AlertKind::MinimumStaffing,
                message: format!("Aucun employé planifié sur le site {}", site.name),
                employee_id: None,
                employee_name: None,
                date: Some(date),
                details: json!({ "siteId": site.id, "siteName": site.name, "planned": 0 }),
            });
        }
    }
    alerts
}

/// Order by kind, then date, then employee name; the id breaks remaining ties.
pub fn sort_alerts(alerts: &mut [LegalAlert]) {
    alerts.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then_with(|| a.date.cmp(&b.date))
            .then_with(|| a.employee_name.cmp(&b.employee_name))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Scan `[start, end]` for legal violations.
pub async fn generate_alerts<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    start: NaiveDate,
    end: NaiveDate,
    limits: &SchedulingConfig,
) -> ServiceResult<Vec<LegalAlert>> {
    validate_range(start, end, limits)?;
    let settings = repo.tenant_settings(tenant_id).await?;

    let schedules = repo
        .find_schedules(tenant_id, &ScheduleFilter::range(start, end).active())
        .await?;
    let shifts: HashMap<_, Shift> = repo
        .list_shifts(tenant_id)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    let employee_ids: Vec<EmployeeId> = schedules.iter().map(|s| s.employee_id).collect();
    let employees: HashMap<EmployeeId, Employee> = repo
        .find_employees(tenant_id, &employee_ids)
        .await?
        .into_iter()
        .map(|e| (e.id, e))
        .collect();

    let worked: Vec<WorkedShift<'_>> = schedules
        .iter()
        .filter_map(|schedule| {
            Some(WorkedShift {
                schedule,
                shift: shifts.get(&schedule.shift_id)?,
                employee: employees.get(&schedule.employee_id)?,
            })
        })
        .collect();

    let mut alerts = Vec::new();
    if settings.alert_weekly_hours_exceeded {
        alerts.extend(weekly_hours_alerts(&worked, &settings));
    }
    if settings.alert_insufficient_rest {
        alerts.extend(rest_alerts(&worked, &settings));
    }
    if settings.alert_night_work_repetitive {
        alerts.extend(night_work_alerts(&worked, &settings));
    }
    if settings.alert_minimum_staffing {
        let sites = repo.list_sites(tenant_id).await?;
        let holidays = repo.holidays_in_range(tenant_id, start, end).await?;
        alerts.extend(staffing_alerts(&worked, &sites, &holidays, &settings, start, end));
    }

    sort_alerts(&mut alerts);
    info!(%start, %end, count = alerts.len(), "Legal alerts generated");
    Ok(alerts)
}

#[cfg(test)]
#[path = "alerts_tests.rs"]
mod alerts_tests;
