//! Replacement requests: one employee covering another's shift for a day.
//!
//! A request starts `PENDING` and is either approved (the original schedule
//! is flagged replaced and the replacement employee gets a schedule) or
//! rejected. Both transitions are only allowed from `PENDING`.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate, Utc};
use tracing::info;

use super::{require_employee, require_shift, ServiceError, ServiceResult};
use crate::config::SchedulingConfig;
use crate::db::repository::{EmployeeFilter, FullRepository, ReplacementFilter, ScheduleFilter};
use crate::models::calendar;
use crate::models::{
    Employee, EmployeeId, Replacement, ReplacementId, ReplacementStatus, Schedule, ScheduleStatus,
    Shift, TenantId, UserId,
};
use crate::routes::replacements::{
    CreateReplacementRequest, ReplacementQuery, ReplacementSuggestion, ReplacementView,
    SuggestionsQuery,
};
use crate::routes::schedules::EmployeeSummary;

/// Reject the day if `employee_id` already works, is on leave or recovers.
async fn ensure_available<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    employee_id: EmployeeId,
    date: NaiveDate,
) -> ServiceResult<()> {
    let busy = repo
        .find_employee_schedules(tenant_id, employee_id, date, date)
        .await?
        .iter()
        .any(Schedule::is_active);
    if busy {
        return Err(ServiceError::Conflict(
            "L'employé remplaçant a déjà un planning ce jour".to_string(),
        ));
    }
    if !repo
        .blocking_leaves(tenant_id, Some(employee_id), date, date)
        .await?
        .is_empty()
    {
        return Err(ServiceError::Conflict(
            "L'employé remplaçant est en congé ce jour".to_string(),
        ));
    }
    if !repo
        .blocking_recovery_days(tenant_id, Some(employee_id), date, date)
        .await?
        .is_empty()
    {
        return Err(ServiceError::Conflict(
            "L'employé remplaçant est en récupération ce jour".to_string(),
        ));
    }
    Ok(())
}

async fn original_schedule<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    employee_id: EmployeeId,
    date: NaiveDate,
) -> ServiceResult<Option<Schedule>> {
    Ok(repo
        .find_employee_schedules(tenant_id, employee_id, date, date)
        .await?
        .into_iter()
        .next())
}

async fn to_views<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    replacements: Vec<Replacement>,
) -> ServiceResult<Vec<ReplacementView>> {
    let ids: Vec<EmployeeId> = replacements
        .iter()
        .flat_map(|r| [r.original_employee_id, r.replacement_employee_id])
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let employees: HashMap<EmployeeId, Employee> = repo
        .find_employees(tenant_id, &ids)
        .await?
        .into_iter()
        .map(|e| (e.id, e))
        .collect();
    let shifts: HashMap<_, Shift> = repo
        .list_shifts(tenant_id)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    Ok(replacements
        .into_iter()
        .map(|replacement| ReplacementView {
            original_employee: employees
                .get(&replacement.original_employee_id)
                .map(EmployeeSummary::from),
            replacement_employee: employees
                .get(&replacement.replacement_employee_id)
                .map(EmployeeSummary::from),
            shift: shifts.get(&replacement.shift_id).cloned(),
            replacement,
        })
        .collect())
}

async fn single_view<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    replacement: Replacement,
) -> ServiceResult<ReplacementView> {
    to_views(repo, tenant_id, vec![replacement])
        .await?
        .pop()
        .ok_or_else(|| ServiceError::NotFound("Remplacement non trouvé".to_string()))
}

pub async fn create<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    req: CreateReplacementRequest,
    user: Option<UserId>,
) -> ServiceResult<ReplacementView> {
    if req.original_employee_id == req.replacement_employee_id {
        return Err(ServiceError::BadRequest(
            "L'employé remplaçant doit être différent de l'employé remplacé".to_string(),
        ));
    }
    require_employee(repo, tenant_id, req.original_employee_id).await?;
    require_employee(repo, tenant_id, req.replacement_employee_id).await?;
    require_shift(repo, tenant_id, req.shift_id).await?;
    ensure_available(repo, tenant_id, req.replacement_employee_id, req.date).await?;

    let original = original_schedule(repo, tenant_id, req.original_employee_id, req.date).await?;
    let now = Utc::now();
    let replacement = Replacement {
        id: ReplacementId::generate(),
        tenant_id,
        date: req.date,
        original_employee_id: req.original_employee_id,
        replacement_employee_id: req.replacement_employee_id,
        shift_id: req.shift_id,
        original_schedule_id: original.map(|s| s.id),
        replacement_schedule_id: None,
        reason: req.reason.filter(|r| !r.trim().is_empty()),
        status: ReplacementStatus::Pending,
        requested_by: user,
        approved_by: None,
        approved_at: None,
        created_at: now,
        updated_at: now,
    };

    let saved = repo.insert_replacement(replacement).await?;
    info!(id = %saved.id, date = %saved.date, "Replacement requested");
    single_view(repo, tenant_id, saved).await
}

pub async fn list<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    query: ReplacementQuery,
) -> ServiceResult<Vec<ReplacementView>> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<ReplacementStatus>)
        .transpose()
        .map_err(ServiceError::BadRequest)?;
    let filter = ReplacementFilter {
        status,
        start_date: query.start_date,
        end_date: query.end_date,
    };
    let replacements = repo.list_replacements(tenant_id, &filter).await?;
    to_views(repo, tenant_id, replacements).await
}

async fn require_pending<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    id: ReplacementId,
    action: &str,
) -> ServiceResult<Replacement> {
    let replacement = repo
        .find_replacement(tenant_id, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Remplacement non trouvé".to_string()))?;
    if replacement.status != ReplacementStatus::Pending {
        return Err(ServiceError::Conflict(format!(
            "Seul un remplacement en attente peut être {}",
            action
        )));
    }
    Ok(replacement)
}

/// Approve a pending request and move the day onto the replacement employee.
pub async fn approve<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    id: ReplacementId,
    approver: Option<UserId>,
) -> ServiceResult<ReplacementView> {
    let mut replacement = require_pending(repo, tenant_id, id, "approuvé").await?;
    ensure_available(
        repo,
        tenant_id,
        replacement.replacement_employee_id,
        replacement.date,
    )
    .await?;

    let now = Utc::now();
    let original = original_schedule(
        repo,
        tenant_id,
        replacement.original_employee_id,
        replacement.date,
    )
    .await?;
    let team_id = original.as_ref().and_then(|s| s.team_id);

    // One slot per employee-day, whatever the status: reuse an inactive one.
    let stale = repo
        .find_employee_schedules(
            tenant_id,
            replacement.replacement_employee_id,
            replacement.date,
            replacement.date,
        )
        .await?
        .into_iter()
        .next();
    let covering = match stale {
        Some(mut schedule) => {
            schedule.shift_id = replacement.shift_id;
            schedule.team_id = team_id;
            schedule.custom_start_time = None;
            schedule.custom_end_time = None;
            schedule.notes = replacement.reason.clone();
            schedule.status = ScheduleStatus::Published;
            schedule.is_replaced = false;
            schedule.replaced_by_id = None;
            schedule.replaced_at = None;
            schedule.updated_at = now;
            repo.update_schedule(schedule)
                .await
                .map_err(ServiceError::from_storage)?
        }
        None => {
            let fresh = Schedule::new(
                tenant_id,
                replacement.replacement_employee_id,
                replacement.shift_id,
                replacement.date,
            )
            .with_team(team_id)
            .with_notes(replacement.reason.clone())
            .created_by(approver);
            repo.insert_schedule(fresh)
                .await
                .map_err(ServiceError::from_storage)?
        }
    };

    if let Some(mut schedule) = original {
        schedule.mark_replaced(replacement.replacement_employee_id, now);
        replacement.original_schedule_id = Some(schedule.id);
        repo.update_schedule(schedule)
            .await
            .map_err(ServiceError::from_storage)?;
    }

    replacement.replacement_schedule_id = Some(covering.id);
    replacement.status = ReplacementStatus::Approved;
    replacement.approved_by = approver;
    replacement.approved_at = Some(now);
    replacement.updated_at = now;
    let saved = repo
        .update_replacement(replacement)
        .await
        .map_err(ServiceError::from_storage)?;

    info!(id = %saved.id, date = %saved.date, "Replacement approved");
    single_view(repo, tenant_id, saved).await
}

pub async fn reject<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    id: ReplacementId,
    approver: Option<UserId>,
) -> ServiceResult<ReplacementView> {
    let mut replacement = require_pending(repo, tenant_id, id, "rejeté").await?;
    let now = Utc::now();
    replacement.status = ReplacementStatus::Rejected;
    replacement.approved_by = approver;
    replacement.approved_at = Some(now);
    replacement.updated_at = now;

    let saved = repo
        .update_replacement(replacement)
        .await
        .map_err(ServiceError::from_storage)?;
    info!(id = %saved.id, "Replacement rejected");
    single_view(repo, tenant_id, saved).await
}

/// Rest in hours between two worked intervals, and whether it is below the
/// minimum that applies after the first one.
fn rest_below_minimum(
    first_end: chrono::NaiveDateTime,
    second_start: chrono::NaiveDateTime,
    first_is_night: bool,
    settings: &crate::models::TenantSettings,
) -> bool {
    let minimum = if first_is_night {
        settings.minimum_rest_hours_night_shift
    } else {
        settings.minimum_rest_hours
    };
    calendar::hours_between(first_end, second_start) < minimum
}

/// Employees who could cover `query.shift_id` on `query.date`, best first.
pub async fn suggestions<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    query: SuggestionsQuery,
    limits: &SchedulingConfig,
) -> ServiceResult<Vec<ReplacementSuggestion>> {
    let shift = require_shift(repo, tenant_id, query.shift_id).await?;
    require_employee(repo, tenant_id, query.original_employee_id).await?;
    let settings = repo.tenant_settings(tenant_id).await?;
    let date = query.date;

    let candidates: Vec<Employee> = repo
        .list_employees(
            tenant_id,
            &EmployeeFilter {
                team_id: query.team_id,
                site_id: query.site_id,
                department_id: query.department_id,
                active_only: true,
            },
        )
        .await?
        .into_iter()
        .filter(|e| e.id != query.original_employee_id)
        .collect();

    let week_start = calendar::week_start(date);
    let week_end = calendar::week_end(date);
    let window_start = week_start.min(date - Duration::days(1));
    let window_end = week_end.max(date + Duration::days(1));

    let mut planned: HashMap<EmployeeId, Vec<Schedule>> = HashMap::new();
    for schedule in repo
        .find_schedules(tenant_id, &ScheduleFilter::range(window_start, window_end).active())
        .await?
    {
        planned.entry(schedule.employee_id).or_default().push(schedule);
    }
    let on_leave: HashSet<EmployeeId> = repo
        .blocking_leaves(tenant_id, None, date, date)
        .await?
        .into_iter()
        .map(|l| l.employee_id)
        .collect();
    let recovering: HashSet<EmployeeId> = repo
        .blocking_recovery_days(tenant_id, None, date, date)
        .await?
        .into_iter()
        .map(|r| r.employee_id)
        .collect();
    let shifts: HashMap<_, Shift> = repo
        .list_shifts(tenant_id)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let (cover_start, cover_end) = calendar::shift_interval(date, shift.start_time, shift.end_time);
    let mut out = Vec::new();
    for employee in candidates {
        if on_leave.contains(&employee.id) || recovering.contains(&employee.id) {
            continue;
        }
        let schedules = planned.get(&employee.id).map(Vec::as_slice).unwrap_or(&[]);
        if schedules.iter().any(|s| s.date == date) {
            continue;
        }

        let week_hours: f64 = schedules
            .iter()
            .filter(|s| s.date >= week_start && s.date <= week_end)
            .filter_map(|s| shifts.get(&s.shift_id).map(|sh| s.worked_hours(sh)))
            .sum();
        let projected = week_hours + shift.hours();
        let exceeds = projected > settings.max_weekly_hours;

        let rest_conflict = schedules.iter().any(|s| {
            let Some(other) = shifts.get(&s.shift_id) else {
                return false;
            };
            let (start, end) =
                calendar::shift_interval(s.date, s.effective_start(other), s.effective_end(other));
            if s.date == date - Duration::days(1) {
                rest_below_minimum(end, cover_start, other.is_night_shift, &settings)
            } else if s.date == date + Duration::days(1) {
                rest_below_minimum(cover_end, start, shift.is_night_shift, &settings)
            } else {
                false
            }
        });

        let mut warnings = Vec::new();
        if exceeds {
            warnings.push(format!(
                "Dépassement du plafond hebdomadaire: {:.1}h (limite: {}h)",
                projected, settings.max_weekly_hours
            ));
        }
        if rest_conflict {
            warnings.push("Repos insuffisant avec un service adjacent".to_string());
        }

        out.push((
            employee.last_name.clone(),
            employee.first_name.clone(),
            ReplacementSuggestion {
                employee: EmployeeSummary::from(&employee),
                projected_weekly_hours: projected,
                exceeds_weekly_limit: exceeds,
                rest_conflict,
                warnings,
            },
        ));
    }

    out.sort_by(|a, b| {
        a.2.warnings
            .is_empty()
            .cmp(&b.2.warnings.is_empty())
            .reverse()
            .then_with(|| a.2.projected_weekly_hours.total_cmp(&b.2.projected_weekly_hours))
            .then_with(|| a.0.cmp(&b.0))
            .then_with(|| a.1.cmp(&b.1))
    });
    let limit = query.limit.unwrap_or(limits.max_suggestions).max(1);
    Ok(out.into_iter().take(limit).map(|(_, _, s)| s).collect())
}

#[cfg(test)]
#[path = "replacements_tests.rs"]
mod replacements_tests;
