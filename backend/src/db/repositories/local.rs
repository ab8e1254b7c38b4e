//! In-memory local repository implementation.
//!
//! All data lives in `HashMap`s behind a single `parking_lot::RwLock`, which
//! makes the repository cheap to clone, deterministic and isolated per test.
//! It can be seeded from a JSON fixture file for local development.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use parking_lot::RwLock;
use serde::Deserialize;

use crate::db::repository::*;
use crate::models::{
    Department, DepartmentId, Employee, EmployeeId, Holiday, HolidayId, Leave, LeaveId,
    RecoveryDay, RecoveryDayId, Replacement, ReplacementId, Schedule, ScheduleId, Shift, ShiftId,
    Site, SiteId, Team, TeamId, Tenant, TenantId,
};

/// In-memory local repository.
///
/// # Example
/// ```
/// use shiftplan::db::repositories::LocalRepository;
/// use shiftplan::db::repository::ScheduleRepository;
///
/// # tokio_test_block(async {
/// let repo = LocalRepository::new();
/// assert!(repo.health_check().await.unwrap());
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    tenants: HashMap<TenantId, Tenant>,
    sites: HashMap<SiteId, Site>,
    departments: HashMap<DepartmentId, Department>,
    teams: HashMap<TeamId, Team>,
    employees: HashMap<EmployeeId, Employee>,
    shifts: HashMap<ShiftId, Shift>,
    holidays: HashMap<HolidayId, Holiday>,
    leaves: HashMap<LeaveId, Leave>,
    recovery_days: HashMap<RecoveryDayId, RecoveryDay>,
    schedules: HashMap<ScheduleId, Schedule>,
    /// Unique index backing the one-schedule-per-employee-day rule.
    schedule_index: HashMap<(TenantId, EmployeeId, NaiveDate), ScheduleId>,
    replacements: HashMap<ReplacementId, Replacement>,

    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            tenants: HashMap::new(),
            sites: HashMap::new(),
            departments: HashMap::new(),
            teams: HashMap::new(),
            employees: HashMap::new(),
            shifts: HashMap::new(),
            holidays: HashMap::new(),
            leaves: HashMap::new(),
            recovery_days: HashMap::new(),
            schedules: HashMap::new(),
            schedule_index: HashMap::new(),
            replacements: HashMap::new(),
            is_healthy: true,
        }
    }
}

/// Seed data layout accepted by [`LocalRepository::from_fixture_file`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Fixture {
    pub tenants: Vec<Tenant>,
    pub sites: Vec<Site>,
    pub departments: Vec<Department>,
    pub teams: Vec<Team>,
    pub employees: Vec<Employee>,
    pub shifts: Vec<Shift>,
    pub holidays: Vec<Holiday>,
    pub leaves: Vec<Leave>,
    pub recovery_days: Vec<RecoveryDay>,
    pub schedules: Vec<Schedule>,
}

impl LocalData {
    fn last_name(&self, employee_id: EmployeeId) -> &str {
        self.employees
            .get(&employee_id)
            .map(|e| e.last_name.as_str())
            .unwrap_or("")
    }

    fn schedule_matches(&self, tenant_id: TenantId, s: &Schedule, filter: &ScheduleFilter) -> bool {
        s.tenant_id == tenant_id
            && filter.matches_date(s.date)
            && (!filter.active_only || s.is_active())
            && filter.employee_id.is_none_or(|e| s.employee_id == e)
            && filter.team_id.is_none_or(|t| s.team_id == Some(t))
            && filter.shift_id.is_none_or(|sh| s.shift_id == sh)
            && filter.site_id.is_none_or(|site| {
                self.employees
                    .get(&s.employee_id)
                    .is_some_and(|e| e.site_id == Some(site))
            })
    }

    fn filtered_schedules(&self, tenant_id: TenantId, filter: &ScheduleFilter) -> Vec<Schedule> {
        let mut out: Vec<Schedule> = self
            .schedules
            .values()
            .filter(|s| self.schedule_matches(tenant_id, s, filter))
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| self.last_name(a.employee_id).cmp(self.last_name(b.employee_id)))
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        out
    }

    fn store_schedule(&mut self, schedule: Schedule) -> RepositoryResult<Schedule> {
        let key = (schedule.tenant_id, schedule.employee_id, schedule.date);
        if self.schedule_index.contains_key(&key) {
            return Err(RepositoryError::conflict_with_context(
                "Un planning existe déjà pour cet employé à cette date",
                ErrorContext::new("insert_schedule")
                    .with_entity("schedule")
                    .with_details(format!("employee={} date={}", schedule.employee_id, schedule.date)),
            ));
        }
        self.schedule_index.insert(key, schedule.id);
        self.schedules.insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    fn remove_schedule(&mut self, id: ScheduleId) -> Option<Schedule> {
        let removed = self.schedules.remove(&id)?;
        self.schedule_index
            .remove(&(removed.tenant_id, removed.employee_id, removed.date));
        Some(removed)
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Create a repository seeded from an in-memory fixture.
    pub fn from_fixture(fixture: Fixture) -> RepositoryResult<Self> {
        let repo = Self::new();
        {
            let mut data = repo.data.write();
            for t in fixture.tenants {
                data.tenants.insert(t.id, t);
            }
            for s in fixture.sites {
                data.sites.insert(s.id, s);
            }
            for d in fixture.departments {
                data.departments.insert(d.id, d);
            }
            for t in fixture.teams {
                data.teams.insert(t.id, t);
            }
            for e in fixture.employees {
                data.employees.insert(e.id, e);
            }
            for s in fixture.shifts {
                data.shifts.insert(s.id, s);
            }
            for h in fixture.holidays {
                data.holidays.insert(h.id, h);
            }
            for l in fixture.leaves {
                data.leaves.insert(l.id, l);
            }
            for r in fixture.recovery_days {
                data.recovery_days.insert(r.id, r);
            }
            for s in fixture.schedules {
                data.store_schedule(s)
                    .map_err(|e| e.with_operation("load_fixture"))?;
            }
        }
        Ok(repo)
    }

    /// Load a JSON fixture file (see [`Fixture`]).
    pub fn from_fixture_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let context = || ErrorContext::new("load_fixture").with_details(path.display().to_string());
        let content = std::fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to read fixture file: {}", e),
                context(),
            )
        })?;
        let fixture: Fixture = serde_json::from_str(&content).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to parse fixture file: {}", e),
                context(),
            )
        })?;
        Self::from_fixture(fixture)
    }

    // ==================== Seeding helpers ====================

    pub fn add_tenant(&self, tenant: Tenant) {
        self.data.write().tenants.insert(tenant.id, tenant);
    }

    pub fn add_site(&self, site: Site) {
        self.data.write().sites.insert(site.id, site);
    }

    pub fn add_department(&self, department: Department) {
        self.data.write().departments.insert(department.id, department);
    }

    pub fn add_team(&self, team: Team) {
        self.data.write().teams.insert(team.id, team);
    }

    pub fn add_employee(&self, employee: Employee) {
        self.data.write().employees.insert(employee.id, employee);
    }

    pub fn add_shift(&self, shift: Shift) {
        self.data.write().shifts.insert(shift.id, shift);
    }

    pub fn add_holiday(&self, holiday: Holiday) {
        self.data.write().holidays.insert(holiday.id, holiday);
    }

    pub fn add_leave(&self, leave: Leave) {
        self.data.write().leaves.insert(leave.id, leave);
    }

    pub fn add_recovery_day(&self, day: RecoveryDay) {
        self.data.write().recovery_days.insert(day.id, day);
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    pub fn schedule_count(&self) -> usize {
        self.data.read().schedules.len()
    }

    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("Storage is not healthy"));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScheduleRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn insert_schedule(&self, schedule: Schedule) -> RepositoryResult<Schedule> {
        self.check_health()?;
        self.data.write().store_schedule(schedule)
    }

    async fn insert_schedules(&self, schedules: Vec<Schedule>) -> RepositoryResult<usize> {
        self.check_health()?;
        let mut data = self.data.write();
        let mut inserted = 0;
        for schedule in schedules {
            if data.store_schedule(schedule).is_ok() {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn update_schedule(&self, schedule: Schedule) -> RepositoryResult<Schedule> {
        self.check_health()?;
        let mut data = self.data.write();
        let previous = match data.schedules.get(&schedule.id) {
            Some(s) if s.tenant_id == schedule.tenant_id => s.clone(),
            _ => {
                return Err(RepositoryError::not_found_with_context(
                    "Planning non trouvé",
                    ErrorContext::new("update_schedule")
                        .with_entity("schedule")
                        .with_entity_id(schedule.id),
                ))
            }
        };

        let old_key = (previous.tenant_id, previous.employee_id, previous.date);
        let new_key = (schedule.tenant_id, schedule.employee_id, schedule.date);
        if old_key != new_key {
            if data.schedule_index.contains_key(&new_key) {
                return Err(RepositoryError::conflict_with_context(
                    "Un planning existe déjà pour cet employé à cette date",
                    ErrorContext::new("update_schedule")
                        .with_entity("schedule")
                        .with_entity_id(schedule.id),
                ));
            }
            data.schedule_index.remove(&old_key);
            data.schedule_index.insert(new_key, schedule.id);
        }
        data.schedules.insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    async fn delete_schedule(&self, tenant_id: TenantId, id: ScheduleId) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write();
        let owned = data
            .schedules
            .get(&id)
            .is_some_and(|s| s.tenant_id == tenant_id);
        if !owned {
            return Err(RepositoryError::not_found_with_context(
                "Planning non trouvé",
                ErrorContext::new("delete_schedule")
                    .with_entity("schedule")
                    .with_entity_id(id),
            ));
        }
        data.remove_schedule(id);
        Ok(())
    }

    async fn delete_schedules(
        &self,
        tenant_id: TenantId,
        ids: &[ScheduleId],
    ) -> RepositoryResult<usize> {
        self.check_health()?;
        let mut data = self.data.write();
        let mut removed = 0;
        for id in ids {
            if data.schedules.get(id).is_some_and(|s| s.tenant_id == tenant_id)
                && data.remove_schedule(*id).is_some()
            {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn find_schedule(
        &self,
        tenant_id: TenantId,
        id: ScheduleId,
    ) -> RepositoryResult<Option<Schedule>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .schedules
            .get(&id)
            .filter(|s| s.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_schedules_by_ids(
        &self,
        tenant_id: TenantId,
        ids: &[ScheduleId],
    ) -> RepositoryResult<Vec<Schedule>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(ids
            .iter()
            .filter_map(|id| data.schedules.get(id))
            .filter(|s| s.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn find_employee_schedules(
        &self,
        tenant_id: TenantId,
        employee_id: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Schedule>> {
        self.check_health()?;
        let filter = ScheduleFilter {
            employee_id: Some(employee_id),
            ..ScheduleFilter::range(start, end)
        };
        Ok(self.data.read().filtered_schedules(tenant_id, &filter))
    }

    async fn find_schedules(
        &self,
        tenant_id: TenantId,
        filter: &ScheduleFilter,
    ) -> RepositoryResult<Vec<Schedule>> {
        self.check_health()?;
        Ok(self.data.read().filtered_schedules(tenant_id, filter))
    }

    async fn list_schedules(
        &self,
        tenant_id: TenantId,
        filter: &ScheduleFilter,
        pagination: Pagination,
    ) -> RepositoryResult<Page<Schedule>> {
        self.check_health()?;
        let all = self.data.read().filtered_schedules(tenant_id, filter);
        let total = all.len();
        let items = all
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.limit)
            .collect();
        Ok(Page { items, total })
    }
}

#[async_trait]
impl OrganizationRepository for LocalRepository {
    async fn find_tenant(&self, tenant_id: TenantId) -> RepositoryResult<Option<Tenant>> {
        self.check_health()?;
        Ok(self.data.read().tenants.get(&tenant_id).cloned())
    }

    async fn find_site(&self, tenant_id: TenantId, id: SiteId) -> RepositoryResult<Option<Site>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .sites
            .get(&id)
            .filter(|s| s.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_sites(&self, tenant_id: TenantId) -> RepositoryResult<Vec<Site>> {
        self.check_health()?;
        let mut sites: Vec<Site> = self
            .data
            .read()
            .sites
            .values()
            .filter(|s| s.tenant_id == tenant_id)
            .cloned()
            .collect();
        sites.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sites)
    }

    async fn find_team(&self, tenant_id: TenantId, id: TeamId) -> RepositoryResult<Option<Team>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .teams
            .get(&id)
            .filter(|t| t.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_team_by_code(
        &self,
        tenant_id: TenantId,
        code: &str,
    ) -> RepositoryResult<Option<Team>> {
        self.check_health()?;
        let code = code.trim();
        Ok(self
            .data
            .read()
            .teams
            .values()
            .find(|t| t.tenant_id == tenant_id && t.code.eq_ignore_ascii_case(code))
            .cloned())
    }

    async fn find_employee(
        &self,
        tenant_id: TenantId,
        id: EmployeeId,
    ) -> RepositoryResult<Option<Employee>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .employees
            .get(&id)
            .filter(|e| e.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_employees(
        &self,
        tenant_id: TenantId,
        ids: &[EmployeeId],
    ) -> RepositoryResult<Vec<Employee>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(ids
            .iter()
            .filter_map(|id| data.employees.get(id))
            .filter(|e| e.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn find_employee_by_matricule(
        &self,
        tenant_id: TenantId,
        matricule: &str,
    ) -> RepositoryResult<Option<Employee>> {
        self.check_health()?;
        let matricule = matricule.trim();
        Ok(self
            .data
            .read()
            .employees
            .values()
            .find(|e| e.tenant_id == tenant_id && e.matricule.eq_ignore_ascii_case(matricule))
            .cloned())
    }

    async fn list_employees(
        &self,
        tenant_id: TenantId,
        filter: &EmployeeFilter,
    ) -> RepositoryResult<Vec<Employee>> {
        self.check_health()?;
        let mut employees: Vec<Employee> = self
            .data
            .read()
            .employees
            .values()
            .filter(|e| e.tenant_id == tenant_id && filter.matches(e))
            .cloned()
            .collect();
        employees.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
        Ok(employees)
    }

    async fn find_shift(&self, tenant_id: TenantId, id: ShiftId) -> RepositoryResult<Option<Shift>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .shifts
            .get(&id)
            .filter(|s| s.tenant_id == tenant_id)
            .cloned())
    }

    async fn find_shift_by_code(
        &self,
        tenant_id: TenantId,
        code: &str,
    ) -> RepositoryResult<Option<Shift>> {
        self.check_health()?;
        let code = code.trim();
        Ok(self
            .data
            .read()
            .shifts
            .values()
            .find(|s| s.tenant_id == tenant_id && s.code.eq_ignore_ascii_case(code))
            .cloned())
    }

    async fn list_shifts(&self, tenant_id: TenantId) -> RepositoryResult<Vec<Shift>> {
        self.check_health()?;
        let mut shifts: Vec<Shift> = self
            .data
            .read()
            .shifts
            .values()
            .filter(|s| s.tenant_id == tenant_id)
            .cloned()
            .collect();
        shifts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(shifts)
    }
}

/// `true` when a recurring holiday's month/day occurs somewhere in `[start, end]`.
fn recurring_in_range(holiday: &Holiday, start: NaiveDate, end: NaiveDate) -> bool {
    (start.year()..=end.year()).any(|year| {
        NaiveDate::from_ymd_opt(year, holiday.date.month(), holiday.date.day())
            .is_some_and(|d| d >= start && d <= end)
    })
}

#[async_trait]
impl AbsenceRepository for LocalRepository {
    async fn holidays_in_range(
        &self,
        tenant_id: TenantId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Holiday>> {
        self.check_health()?;
        let mut holidays: Vec<Holiday> = self
            .data
            .read()
            .holidays
            .values()
            .filter(|h| h.tenant_id == tenant_id)
            .filter(|h| {
                if h.is_recurring {
                    recurring_in_range(h, start, end)
                } else {
                    h.date >= start && h.date <= end
                }
            })
            .cloned()
            .collect();
        holidays.sort_by_key(|h| h.date);
        Ok(holidays)
    }

    async fn blocking_leaves(
        &self,
        tenant_id: TenantId,
        employee_id: Option<EmployeeId>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Leave>> {
        self.check_health()?;
        let mut leaves: Vec<Leave> = self
            .data
            .read()
            .leaves
            .values()
            .filter(|l| {
                l.tenant_id == tenant_id
                    && l.status.blocks_planning()
                    && employee_id.is_none_or(|e| l.employee_id == e)
                    && l.overlaps(start, end)
            })
            .cloned()
            .collect();
        leaves.sort_by_key(|l| l.start_date);
        Ok(leaves)
    }

    async fn blocking_recovery_days(
        &self,
        tenant_id: TenantId,
        employee_id: Option<EmployeeId>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<RecoveryDay>> {
        self.check_health()?;
        let mut days: Vec<RecoveryDay> = self
            .data
            .read()
            .recovery_days
            .values()
            .filter(|r| {
                r.tenant_id == tenant_id
                    && r.status.blocks_planning()
                    && employee_id.is_none_or(|e| r.employee_id == e)
                    && r.overlaps(start, end)
            })
            .cloned()
            .collect();
        days.sort_by_key(|r| r.start_date);
        Ok(days)
    }
}

#[async_trait]
impl ReplacementRepository for LocalRepository {
    async fn insert_replacement(&self, replacement: Replacement) -> RepositoryResult<Replacement> {
        self.check_health()?;
        self.data
            .write()
            .replacements
            .insert(replacement.id, replacement.clone());
        Ok(replacement)
    }

    async fn update_replacement(&self, replacement: Replacement) -> RepositoryResult<Replacement> {
        self.check_health()?;
        let mut data = self.data.write();
        let owned = data
            .replacements
            .get(&replacement.id)
            .is_some_and(|r| r.tenant_id == replacement.tenant_id);
        if !owned {
            return Err(RepositoryError::not_found_with_context(
                "Remplacement non trouvé",
                ErrorContext::new("update_replacement")
                    .with_entity("replacement")
                    .with_entity_id(replacement.id),
            ));
        }
        data.replacements.insert(replacement.id, replacement.clone());
        Ok(replacement)
    }

    async fn find_replacement(
        &self,
        tenant_id: TenantId,
        id: ReplacementId,
    ) -> RepositoryResult<Option<Replacement>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .replacements
            .get(&id)
            .filter(|r| r.tenant_id == tenant_id)
            .cloned())
    }

    async fn list_replacements(
        &self,
        tenant_id: TenantId,
        filter: &ReplacementFilter,
    ) -> RepositoryResult<Vec<Replacement>> {
        self.check_health()?;
        let mut out: Vec<Replacement> = self
            .data
            .read()
            .replacements
            .values()
            .filter(|r| r.tenant_id == tenant_id && filter.matches(r))
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(out)
    }
}
