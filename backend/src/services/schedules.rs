//! Schedule CRUD, range creation and the week/month planning windows.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use super::exclusion::{ExclusionRules, PlanningContext};
use super::{
    parse_optional_time, require_employee, require_shift, require_team, validate_range,
    ServiceError, ServiceResult,
};
use crate::config::SchedulingConfig;
use crate::db::repository::{
    EmployeeFilter, FullRepository, Pagination, ReplacementFilter, ScheduleFilter,
};
use crate::models::calendar;
use crate::models::{
    Employee, EmployeeId, Schedule, ScheduleId, ShiftId, TenantId, TimeOfDay, UserId,
};
use crate::routes::schedules::{
    BulkCreateResponse, BulkDeleteResponse, CreateScheduleRequest, CreateScheduleResponse,
    DateRange, EmployeeSummary, PageMeta, PlanningView, ScheduleListResponse, ScheduleQuery,
    ScheduleView, UpdateScheduleRequest, ViewFilter,
};

fn rules_for(req: &CreateScheduleRequest) -> ExclusionRules {
    ExclusionRules {
        working_days: req.exclude_non_working_days,
        holidays: req.exclude_holidays,
        leaves: req.respect_leaves,
        recovery_days: req.respect_recovery_days,
        existing_schedules: true,
    }
}

/// Build an unsaved schedule for every accepted date of `req`.
fn build_schedules(
    tenant_id: TenantId,
    req: &CreateScheduleRequest,
    dates: &[NaiveDate],
    times: (Option<TimeOfDay>, Option<TimeOfDay>),
    user: Option<UserId>,
) -> Vec<Schedule> {
    dates
        .iter()
        .map(|date| {
            Schedule::new(tenant_id, req.employee_id, req.shift_id, *date)
                .with_team(req.team_id)
                .with_custom_times(times.0, times.1)
                .with_notes(req.notes.clone())
                .created_by(user)
        })
        .collect()
}

/// Assign a shift to one employee for every date of `[date_debut, date_fin]`
/// that survives the exclusion chain.
pub async fn create<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    req: CreateScheduleRequest,
    user: Option<UserId>,
    limits: &SchedulingConfig,
) -> ServiceResult<CreateScheduleResponse> {
    let employee = require_employee(repo, tenant_id, req.employee_id).await?;
    require_shift(repo, tenant_id, req.shift_id).await?;
    if let Some(team_id) = req.team_id {
        require_team(repo, tenant_id, team_id).await?;
    }

    let start = req.date_debut;
    let end = req.end_date();
    validate_range(start, end, limits)?;
    let start_time = parse_optional_time(req.custom_start_time.as_deref(), "Heure début")?;
    let end_time = parse_optional_time(req.custom_end_time.as_deref(), "Heure fin")?;

    let dates = calendar::date_range(start, end);
    let mut ctx = PlanningContext::load(repo, tenant_id, &employee, start, end).await?;
    let partition = ctx.partition(dates.iter().copied(), &rules_for(&req));
    let skipped = partition.already_planned();

    if partition.accepted.is_empty() {
        let message = if skipped == dates.len() {
            "Tous les plannings pour cette période existent déjà"
        } else {
            "Aucun planning créé : toutes les dates de la période sont exclues"
        };
        return Err(ServiceError::Conflict(message.to_string()));
    }

    let schedules = build_schedules(
        tenant_id,
        &req,
        &partition.accepted,
        (start_time, end_time),
        user,
    );
    let created = repo.insert_schedules(schedules).await?;
    let excluded_only = partition.excluded.len() - skipped;

    let mut message = format!("{} planning(s) créé(s)", created);
    if skipped > 0 {
        message.push_str(&format!(", {} ignoré(s) (déjà existants)", skipped));
    }
    if excluded_only > 0 {
        message.push_str(&format!(", {} exclu(s)", excluded_only));
    }

    info!(
        employee = %employee.matricule,
        %start,
        %end,
        created,
        skipped,
        excluded = excluded_only,
        "Schedules created"
    );

    Ok(CreateScheduleResponse {
        count: created,
        created,
        skipped,
        excluded: partition.excluded,
        date_range: DateRange { start, end },
        message,
    })
}

/// Create many range assignments at once.
///
/// Unknown employees, shifts or teams reject the whole batch. Entries with an
/// invalid range or time are skipped. Dates are deduplicated across the batch
/// per employee.
pub async fn create_bulk<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    entries: Vec<CreateScheduleRequest>,
    user: Option<UserId>,
    limits: &SchedulingConfig,
) -> ServiceResult<BulkCreateResponse> {
    if entries.is_empty() {
        return Err(ServiceError::BadRequest(
            "Aucun planning fourni".to_string(),
        ));
    }

    let employee_ids: Vec<EmployeeId> = entries
        .iter()
        .map(|e| e.employee_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let employees: HashMap<EmployeeId, Employee> = repo
        .find_employees(tenant_id, &employee_ids)
        .await?
        .into_iter()
        .map(|e| (e.id, e))
        .collect();
    if employees.len() != employee_ids.len() {
        return Err(ServiceError::NotFound(
            "Un ou plusieurs employés non trouvés".to_string(),
        ));
    }

    let shift_ids: HashSet<ShiftId> = entries.iter().map(|e| e.shift_id).collect();
    for shift_id in shift_ids {
        if repo.find_shift(tenant_id, shift_id).await?.is_none() {
            return Err(ServiceError::NotFound(
                "Un ou plusieurs shifts non trouvés".to_string(),
            ));
        }
    }
    let team_ids: HashSet<_> = entries.iter().filter_map(|e| e.team_id).collect();
    for team_id in team_ids {
        if repo.find_team(tenant_id, team_id).await?.is_none() {
            return Err(ServiceError::NotFound(
                "Une ou plusieurs équipes non trouvées".to_string(),
            ));
        }
    }

    // Drop invalid entries and compute each employee's overall window.
    let mut valid = Vec::with_capacity(entries.len());
    let mut windows: HashMap<EmployeeId, (NaiveDate, NaiveDate)> = HashMap::new();
    for (index, entry) in entries.into_iter().enumerate() {
        let end = entry.end_date();
        let times = validate_range(entry.date_debut, end, limits).and_then(|_| {
            Ok((
                parse_optional_time(entry.custom_start_time.as_deref(), "Heure début")?,
                parse_optional_time(entry.custom_end_time.as_deref(), "Heure fin")?,
            ))
        });
        match times {
            Ok(times) => {
                windows
                    .entry(entry.employee_id)
                    .and_modify(|(s, e)| {
                        *s = (*s).min(entry.date_debut);
                        *e = (*e).max(end);
                    })
                    .or_insert((entry.date_debut, end));
                valid.push((entry, times));
            }
            Err(err) => warn!(index, error = %err, "Skipping invalid bulk entry"),
        }
    }

    let mut contexts: HashMap<EmployeeId, PlanningContext> = HashMap::new();
    for (employee_id, (start, end)) in &windows {
        if let Some(employee) = employees.get(employee_id) {
            let ctx = PlanningContext::load(repo, tenant_id, employee, *start, *end).await?;
            contexts.insert(*employee_id, ctx);
        }
    }

    let mut total = 0;
    let mut excluded = Vec::new();
    let mut schedules = Vec::new();
    for (entry, times) in &valid {
        let Some(ctx) = contexts.get_mut(&entry.employee_id) else {
            continue;
        };
        let dates = calendar::date_range(entry.date_debut, entry.end_date());
        total += dates.len();
        let partition = ctx.partition(dates, &rules_for(entry));
        schedules.extend(build_schedules(
            tenant_id,
            entry,
            &partition.accepted,
            *times,
            user,
        ));
        excluded.extend(partition.excluded);
    }

    if total == 0 {
        return Err(ServiceError::BadRequest(
            "Aucun planning valide à créer".to_string(),
        ));
    }

    let count = repo.insert_schedules(schedules).await?;
    let skipped = total - count;
    info!(count, total, skipped, "Bulk schedules created");

    Ok(BulkCreateResponse {
        count,
        total,
        skipped,
        excluded,
        message: format!("{} planning(s) créé(s) sur {} date(s)", count, total),
    })
}

/// Join schedules with their employee and shift.
pub(crate) async fn to_views<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    schedules: Vec<Schedule>,
) -> ServiceResult<Vec<ScheduleView>> {
    let employee_ids: Vec<EmployeeId> = schedules
        .iter()
        .map(|s| s.employee_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let employees: HashMap<EmployeeId, Employee> = repo
        .find_employees(tenant_id, &employee_ids)
        .await?
        .into_iter()
        .map(|e| (e.id, e))
        .collect();
    let shifts: HashMap<_, _> = repo
        .list_shifts(tenant_id)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    Ok(schedules
        .into_iter()
        .map(|schedule| ScheduleView {
            employee: employees.get(&schedule.employee_id).map(EmployeeSummary::from),
            shift: shifts.get(&schedule.shift_id).cloned(),
            schedule,
        })
        .collect())
}

pub async fn find_all<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    query: ScheduleQuery,
    limits: &SchedulingConfig,
) -> ServiceResult<ScheduleListResponse> {
    let pagination = Pagination::new(
        query.page.unwrap_or(1),
        query.limit.unwrap_or(limits.default_page_size),
    );
    let filter = ScheduleFilter {
        employee_id: query.employee_id,
        team_id: query.team_id,
        shift_id: query.shift_id,
        site_id: query.site_id,
        start_date: query.start_date,
        end_date: query.end_date,
        active_only: false,
    };

    let page = repo.list_schedules(tenant_id, &filter, pagination).await?;
    let data = to_views(repo, tenant_id, page.items).await?;

    Ok(ScheduleListResponse {
        data,
        meta: PageMeta {
            total: page.total,
            page: pagination.page,
            limit: pagination.limit,
            total_pages: page.total.div_ceil(pagination.limit),
        },
    })
}

async fn require_schedule<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    id: ScheduleId,
) -> ServiceResult<Schedule> {
    repo.find_schedule(tenant_id, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Planning non trouvé".to_string()))
}

pub async fn find_one<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    id: ScheduleId,
) -> ServiceResult<ScheduleView> {
    let schedule = require_schedule(repo, tenant_id, id).await?;
    let mut views = to_views(repo, tenant_id, vec![schedule]).await?;
    views
        .pop()
        .ok_or_else(|| ServiceError::NotFound("Planning non trouvé".to_string()))
}

/// Patch a schedule. A blank custom time clears the override.
pub async fn update<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    id: ScheduleId,
    req: UpdateScheduleRequest,
) -> ServiceResult<ScheduleView> {
    let mut schedule = require_schedule(repo, tenant_id, id).await?;

    if let Some(shift_id) = req.shift_id {
        require_shift(repo, tenant_id, shift_id).await?;
        schedule.shift_id = shift_id;
    }
    if let Some(team_id) = req.team_id {
        require_team(repo, tenant_id, team_id).await?;
        schedule.team_id = Some(team_id);
    }
    if let Some(date) = req.date {
        schedule.date = date;
    }
    if let Some(raw) = req.custom_start_time.as_deref() {
        schedule.custom_start_time = parse_optional_time(Some(raw), "Heure début")?;
    }
    if let Some(raw) = req.custom_end_time.as_deref() {
        schedule.custom_end_time = parse_optional_time(Some(raw), "Heure fin")?;
    }
    if req.notes.is_some() {
        schedule = schedule.with_notes(req.notes);
    }
    if let Some(status) = req.status {
        schedule.status = status;
    }
    schedule.updated_at = Utc::now();

    let saved = repo
        .update_schedule(schedule)
        .await
        .map_err(ServiceError::from_storage)?;
    let mut views = to_views(repo, tenant_id, vec![saved]).await?;
    views
        .pop()
        .ok_or_else(|| ServiceError::NotFound("Planning non trouvé".to_string()))
}

pub async fn remove<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    id: ScheduleId,
) -> ServiceResult<()> {
    require_schedule(repo, tenant_id, id).await?;
    repo.delete_schedule(tenant_id, id)
        .await
        .map_err(ServiceError::from_storage)?;
    info!(%id, "Schedule deleted");
    Ok(())
}

/// Delete several schedules. Nothing is deleted unless every id belongs to the tenant.
pub async fn remove_bulk<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    ids: Vec<ScheduleId>,
) -> ServiceResult<BulkDeleteResponse> {
    if ids.is_empty() {
        return Err(ServiceError::BadRequest(
            "Aucun ID fourni pour la suppression".to_string(),
        ));
    }
    let unique: Vec<ScheduleId> = ids
        .into_iter()
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let found = repo.find_schedules_by_ids(tenant_id, &unique).await?;
    if found.len() != unique.len() {
        return Err(ServiceError::BadRequest(
            "Certains plannings n'existent pas ou n'appartiennent pas à votre entreprise"
                .to_string(),
        ));
    }

    let deleted = repo.delete_schedules(tenant_id, &unique).await?;
    info!(deleted, "Schedules deleted");
    Ok(BulkDeleteResponse {
        count: deleted,
        deleted,
    })
}

/// Monday to Sunday around `date`.
pub async fn week_view<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    date: NaiveDate,
    filter: ViewFilter,
) -> ServiceResult<PlanningView> {
    planning_window(
        repo,
        tenant_id,
        calendar::week_start(date),
        calendar::week_end(date),
        filter,
    )
    .await
}

/// First to last day of the month holding `date`.
pub async fn month_view<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    date: NaiveDate,
    filter: ViewFilter,
) -> ServiceResult<PlanningView> {
    let (start, end) = calendar::month_bounds(date);
    planning_window(repo, tenant_id, start, end, filter).await
}

async fn planning_window<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    start: NaiveDate,
    end: NaiveDate,
    filter: ViewFilter,
) -> ServiceResult<PlanningView> {
    let schedule_filter = ScheduleFilter {
        team_id: filter.team_id,
        site_id: filter.site_id,
        ..ScheduleFilter::range(start, end)
    };
    let schedules = repo.find_schedules(tenant_id, &schedule_filter).await?;
    let mut leaves = repo.blocking_leaves(tenant_id, None, start, end).await?;
    let mut replacements = repo
        .list_replacements(
            tenant_id,
            &ReplacementFilter {
                status: None,
                start_date: Some(start),
                end_date: Some(end),
            },
        )
        .await?;

    if filter.team_id.is_some() || filter.site_id.is_some() {
        let members: HashSet<EmployeeId> = repo
            .list_employees(
                tenant_id,
                &EmployeeFilter {
                    team_id: filter.team_id,
                    site_id: filter.site_id,
                    ..Default::default()
                },
            )
            .await?
            .into_iter()
            .map(|e| e.id)
            .collect();
        leaves.retain(|l| members.contains(&l.employee_id));
        replacements.retain(|r| {
            members.contains(&r.original_employee_id) || members.contains(&r.replacement_employee_id)
        });
    }

    Ok(PlanningView {
        start_date: start,
        end_date: end,
        schedules: to_views(repo, tenant_id, schedules).await?,
        leaves,
        replacements,
    })
}

#[cfg(test)]
#[path = "schedules_tests.rs"]
mod schedules_tests;
