//! Work/rest cycle planning.
//!
//! Each employee enters the cycle on their own start date: day `n` of the
//! range (0-based from that start) is a work day when
//! `n mod (work_days + rest_days) < work_days`. Rest days never become
//! schedules, so the working-day rule of the exclusion chain is disabled here.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use super::exclusion::{ExclusionRules, PlanningContext};
use super::{require_employee, require_shift, require_team, validate_range, ServiceError, ServiceResult};
use crate::config::SchedulingConfig;
use crate::db::repository::FullRepository;
use crate::models::calendar;
use crate::models::{Employee, Schedule, Shift, TenantId, UserId};
use crate::routes::rotation::{
    EmployeeRotation, EmployeeRotationPreview, EmployeeRotationResult, GenerateRotationRequest,
    RotationDay, RotationPreviewRequest, RotationPreviewResponse, RotationResult,
};

const MAX_CYCLE_DAYS: u32 = 7;

/// A validated work/rest cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationCycle {
    work_days: u32,
    rest_days: u32,
}

impl RotationCycle {
    pub fn new(work_days: u32, rest_days: u32) -> ServiceResult<Self> {
        if !(1..=MAX_CYCLE_DAYS).contains(&work_days) {
            return Err(ServiceError::BadRequest(format!(
                "Le nombre de jours de travail doit être compris entre 1 et {}",
                MAX_CYCLE_DAYS
            )));
        }
        if !(1..=MAX_CYCLE_DAYS).contains(&rest_days) {
            return Err(ServiceError::BadRequest(format!(
                "Le nombre de jours de repos doit être compris entre 1 et {}",
                MAX_CYCLE_DAYS
            )));
        }
        Ok(Self {
            work_days,
            rest_days,
        })
    }

    pub fn is_work_day(&self, cycle_start: NaiveDate, date: NaiveDate) -> bool {
        let offset = (date - cycle_start).num_days();
        let length = i64::from(self.work_days + self.rest_days);
        offset.rem_euclid(length) < i64::from(self.work_days)
    }

    /// Work days of `[start, end]` for a cycle entered on `start`.
    pub fn work_dates(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        calendar::date_range(start, end)
            .into_iter()
            .filter(|date| self.is_work_day(start, *date))
            .collect()
    }
}

fn require_employees_listed(employees: &[EmployeeRotation]) -> ServiceResult<()> {
    if employees.is_empty() {
        return Err(ServiceError::BadRequest(
            "Au moins un employé doit être sélectionné".to_string(),
        ));
    }
    Ok(())
}

/// Day-by-day cycle for each employee, without writing anything.
pub async fn preview<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    req: RotationPreviewRequest,
    limits: &SchedulingConfig,
) -> ServiceResult<RotationPreviewResponse> {
    let cycle = RotationCycle::new(req.work_days, req.rest_days)?;
    require_employees_listed(&req.employees)?;

    let mut employees = Vec::with_capacity(req.employees.len());
    for entry in &req.employees {
        let employee = require_employee(repo, tenant_id, entry.employee_id).await?;
        validate_range(entry.start_date, req.end_date, limits)?;
        employees.push((employee, entry.start_date));
    }

    let earliest = employees
        .iter()
        .map(|(_, start)| *start)
        .min()
        .unwrap_or(req.end_date);
    let holidays = repo
        .holidays_in_range(tenant_id, earliest, req.end_date)
        .await?;

    let mut preview = Vec::with_capacity(employees.len());
    for (employee, start) in employees {
        let schedule: Vec<RotationDay> = calendar::date_range(start, req.end_date)
            .into_iter()
            .map(|date| {
                let is_work_day = cycle.is_work_day(start, date);
                RotationDay {
                    date,
                    day_of_week: calendar::french_day_name(date).to_string(),
                    is_work_day,
                    supplementary_type: is_work_day
                        .then(|| calendar::classify_supplementary_day(date, &holidays))
                        .flatten(),
                }
            })
            .collect();
        let total_work_days = schedule.iter().filter(|d| d.is_work_day).count();
        preview.push(EmployeeRotationPreview {
            employee_id: employee.id,
            matricule: employee.matricule.clone(),
            employee_name: employee.full_name(),
            start_date: start,
            total_rest_days: schedule.len() - total_work_days,
            total_work_days,
            schedule,
        });
    }

    let total_schedules_to_create = preview.iter().map(|p| p.total_work_days).sum();
    Ok(RotationPreviewResponse {
        preview,
        total_schedules_to_create,
    })
}

/// Write the cycle's work days as schedules.
///
/// A failing employee is reported in the details and counted in `failed`;
/// the others are still planned.
pub async fn generate<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    req: GenerateRotationRequest,
    user: Option<UserId>,
    limits: &SchedulingConfig,
) -> ServiceResult<RotationResult> {
    let cycle = RotationCycle::new(req.work_days, req.rest_days)?;
    require_employees_listed(&req.employees)?;
    let shift = require_shift(repo, tenant_id, req.shift_id).await?;
    if let Some(team_id) = req.team_id {
        require_team(repo, tenant_id, team_id).await?;
    }

    let rules = ExclusionRules {
        working_days: false,
        holidays: req.respect_holidays,
        leaves: req.respect_leaves,
        recovery_days: req.respect_recovery_days,
        existing_schedules: !req.overwrite_existing,
    };

    let mut result = RotationResult::default();
    for entry in &req.employees {
        let employee = match repo.find_employee(tenant_id, entry.employee_id).await? {
            Some(employee) => employee,
            None => {
                warn!(employee_id = %entry.employee_id, "Rotation skipped unknown employee");
                result.failed += 1;
                result.details.push(EmployeeRotationResult {
                    employee_id: entry.employee_id,
                    matricule: String::new(),
                    employee_name: String::new(),
                    created: 0,
                    updated: 0,
                    skipped: 0,
                    excluded: Vec::new(),
                    errors: vec!["Employé non trouvé".to_string()],
                });
                continue;
            }
        };

        let mut detail = EmployeeRotationResult {
            employee_id: employee.id,
            matricule: employee.matricule.clone(),
            employee_name: employee.full_name(),
            created: 0,
            updated: 0,
            skipped: 0,
            excluded: Vec::new(),
            errors: Vec::new(),
        };

        let outcome = plan_employee(
            repo,
            tenant_id,
            &employee,
            entry.start_date,
            &req,
            &shift,
            cycle,
            &rules,
            user,
            limits,
            &mut detail,
        )
        .await;

        match outcome {
            Ok(()) => {
                result.success += detail.created;
                result.updated += detail.updated;
                result.skipped += detail.skipped;
            }
            Err(err) => {
                warn!(employee = %employee.matricule, error = %err, "Rotation failed for employee");
                result.failed += 1;
                detail.errors.push(err.to_string());
            }
        }
        result.details.push(detail);
    }

    info!(
        created = result.success,
        updated = result.updated,
        skipped = result.skipped,
        failed = result.failed,
        "Rotation generated"
    );
    Ok(result)
}

#[allow(clippy::too_many_arguments)]
async fn plan_employee<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    employee: &Employee,
    start: NaiveDate,
    req: &GenerateRotationRequest,
    shift: &Shift,
    cycle: RotationCycle,
    rules: &ExclusionRules,
    user: Option<UserId>,
    limits: &SchedulingConfig,
    detail: &mut EmployeeRotationResult,
) -> ServiceResult<()> {
    validate_range(start, req.end_date, limits)?;

    let mut ctx = PlanningContext::load(repo, tenant_id, employee, start, req.end_date).await?;
    let partition = ctx.partition(cycle.work_dates(start, req.end_date), rules);
    detail.skipped += partition.already_planned();
    detail.excluded = partition.excluded;

    let mut existing: HashMap<NaiveDate, Schedule> = if req.overwrite_existing {
        repo.find_employee_schedules(tenant_id, employee.id, start, req.end_date)
            .await?
            .into_iter()
            .map(|s| (s.date, s))
            .collect()
    } else {
        HashMap::new()
    };

    let mut fresh = Vec::new();
    for date in partition.accepted {
        match existing.remove(&date) {
            Some(current) if current.shift_id == shift.id => detail.skipped += 1,
            Some(mut current) => {
                current.shift_id = shift.id;
                if req.team_id.is_some() {
                    current.team_id = req.team_id;
                }
                current.updated_at = Utc::now();
                repo.update_schedule(current)
                    .await
                    .map_err(ServiceError::from_storage)?;
                detail.updated += 1;
            }
            None => fresh.push(
                Schedule::new(tenant_id, employee.id, shift.id, date)
                    .with_team(req.team_id)
                    .created_by(user),
            ),
        }
    }

    let requested = fresh.len();
    let inserted = repo.insert_schedules(fresh).await?;
    detail.created += inserted;
    detail.skipped += requested - inserted;
    Ok(())
}

#[cfg(test)]
#[path = "rotation_tests.rs"]
mod rotation_tests;
