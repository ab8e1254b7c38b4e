//! Holidays, leaves and recovery days.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::models::{EmployeeId, Holiday, Leave, RecoveryDay, TenantId};

#[async_trait]
pub trait AbsenceRepository: Send + Sync {
    /// Holidays falling between `start` and `end`, recurring ones included
    /// whenever their month/day lands in the range.
    async fn holidays_in_range(
        &self,
        tenant_id: TenantId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Holiday>>;

    /// Approved leaves overlapping the range, optionally restricted to one employee.
    async fn blocking_leaves(
        &self,
        tenant_id: TenantId,
        employee_id: Option<EmployeeId>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<Leave>>;

    /// Approved or used recovery days overlapping the range.
    async fn blocking_recovery_days(
        &self,
        tenant_id: TenantId,
        employee_id: Option<EmployeeId>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<RecoveryDay>>;
}
