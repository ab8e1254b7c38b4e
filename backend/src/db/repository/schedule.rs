//! Schedule repository trait: CRUD, range queries and paginated listing.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use super::error::RepositoryResult;
use crate::models::{EmployeeId, Schedule, ScheduleId, ShiftId, SiteId, TeamId, TenantId};

/// Optional criteria for schedule queries. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ScheduleFilter {
    pub employee_id: Option<EmployeeId>,
    pub team_id: Option<TeamId>,
    pub shift_id: Option<ShiftId>,
    /// Matches schedules whose employee belongs to the site.
    pub site_id: Option<SiteId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Skip cancelled, suspended and replaced schedules.
    pub active_only: bool,
}

impl ScheduleFilter {
    pub fn range(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: Some(start),
            end_date: Some(end),
            ..Default::default()
        }
    }

    pub fn active(mut self) -> Self {
        self.active_only = true;
        self
    }

    pub fn matches_date(&self, date: NaiveDate) -> bool {
        self.start_date.is_none_or(|s| date >= s) && self.end_date.is_none_or(|e| date <= e)
    }
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
}

impl Pagination {
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Repository trait for schedule storage.
///
/// The store enforces one schedule per employee per day: inserting or moving a
/// schedule onto a date the employee already holds yields
/// [`RepositoryError::Conflict`](super::RepositoryError::Conflict).
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    // ==================== Health & Connection ====================

    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Writes ====================

    /// Insert a single schedule.
    async fn insert_schedule(&self, schedule: Schedule) -> RepositoryResult<Schedule>;

    /// Insert many schedules, silently skipping employee-days that already
    /// hold one. Returns the number actually inserted.
    async fn insert_schedules(&self, schedules: Vec<Schedule>) -> RepositoryResult<usize>;

    /// Replace a stored schedule.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the id is unknown for the tenant
    /// * `Err(RepositoryError::Conflict)` - If the new date collides with another schedule
    async fn update_schedule(&self, schedule: Schedule) -> RepositoryResult<Schedule>;

    async fn delete_schedule(&self, tenant_id: TenantId, id: ScheduleId) -> RepositoryResult<()>;

    /// Delete every listed schedule. Returns the number removed.
    async fn delete_schedules(
        &self,
        tenant_id: TenantId,
        ids: &[ScheduleId],
    ) -> RepositoryResult<usize>;

    // ==================== Reads ====================

    async fn find_schedule(
        &self,
        tenant_id: TenantId,
        id: ScheduleId,
    ) -> RepositoryResult<Option<Schedule>>;

    async fn find_schedules_by_ids(
        &self,
        tenant_id: TenantId,
        ids: &[ScheduleId],
    ) -> RepositoryResult<Vec<Schedule>>;

    /// All schedules (any status) of one employee between two dates, inclusive, sorted by date.
    async fn find_employee_schedules(
        &self,
        tenant_id: TenantId,
        employee_id: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Schedule>>;

    /// Schedules matching `filter`, ordered by date then employee last name.
    async fn find_schedules(
        &self,
        tenant_id: TenantId,
        filter: &ScheduleFilter,
    ) -> RepositoryResult<Vec<Schedule>>;

    /// One page of [`find_schedules`](Self::find_schedules) plus the total count.
    async fn list_schedules(
        &self,
        tenant_id: TenantId,
        filter: &ScheduleFilter,
        pagination: Pagination,
    ) -> RepositoryResult<Page<Schedule>>;
}
