//! Lookups over the tenant structure.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{
    DepartmentId, Employee, EmployeeId, Shift, ShiftId, Site, SiteId, Team, TeamId, Tenant,
    TenantId, TenantSettings,
};

#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub team_id: Option<TeamId>,
    pub site_id: Option<SiteId>,
    pub department_id: Option<DepartmentId>,
    pub active_only: bool,
}

impl EmployeeFilter {
    pub fn matches(&self, employee: &Employee) -> bool {
        (!self.active_only || employee.is_active)
            && self.team_id.is_none_or(|t| employee.team_id == Some(t))
            && self.site_id.is_none_or(|s| employee.site_id == Some(s))
            && self.department_id.is_none_or(|d| employee.department_id == Some(d))
    }
}

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn find_tenant(&self, tenant_id: TenantId) -> RepositoryResult<Option<Tenant>>;

    /// Planning settings of the tenant, defaults when the tenant has none stored.
    async fn tenant_settings(&self, tenant_id: TenantId) -> RepositoryResult<TenantSettings> {
        Ok(self
            .find_tenant(tenant_id)
            .await?
            .map(|t| t.settings)
            .unwrap_or_default())
    }

    async fn find_site(&self, tenant_id: TenantId, id: SiteId) -> RepositoryResult<Option<Site>>;

    async fn list_sites(&self, tenant_id: TenantId) -> RepositoryResult<Vec<Site>>;

    async fn find_team(&self, tenant_id: TenantId, id: TeamId) -> RepositoryResult<Option<Team>>;

    /// Case-insensitive lookup on the team code.
    async fn find_team_by_code(
        &self,
        tenant_id: TenantId,
        code: &str,
    ) -> RepositoryResult<Option<Team>>;

    async fn find_employee(
        &self,
        tenant_id: TenantId,
        id: EmployeeId,
    ) -> RepositoryResult<Option<Employee>>;

    async fn find_employees(
        &self,
        tenant_id: TenantId,
        ids: &[EmployeeId],
    ) -> RepositoryResult<Vec<Employee>>;

    /// Case-insensitive lookup on the matricule.
    async fn find_employee_by_matricule(
        &self,
        tenant_id: TenantId,
        matricule: &str,
    ) -> RepositoryResult<Option<Employee>>;

    /// Employees matching `filter`, ordered by last then first name.
    async fn list_employees(
        &self,
        tenant_id: TenantId,
        filter: &EmployeeFilter,
    ) -> RepositoryResult<Vec<Employee>>;

    async fn find_shift(&self, tenant_id: TenantId, id: ShiftId) -> RepositoryResult<Option<Shift>>;

    /// Case-insensitive lookup on the shift code.
    async fn find_shift_by_code(
        &self,
        tenant_id: TenantId,
        code: &str,
    ) -> RepositoryResult<Option<Shift>>;

    async fn list_shifts(&self, tenant_id: TenantId) -> RepositoryResult<Vec<Shift>>;
}
