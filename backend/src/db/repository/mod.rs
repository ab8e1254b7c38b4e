//! Repository trait definitions for storage operations.
//!
//! Responsibilities are split across focused traits so that services only
//! depend on what they use:
//!
//! - [`schedule`]: schedule CRUD and range queries
//! - [`organization`]: tenants, sites, teams, employees and shifts
//! - [`absence`]: holidays, leaves and recovery days
//! - [`replacement`]: replacement requests
//!
//! Every query is scoped by a [`TenantId`](crate::models::TenantId); nothing
//! crosses tenant boundaries.
//!
//! # Convenience Trait Bound
//!
//! ```ignore
//! async fn my_service<R: FullRepository + ?Sized>(repo: &R, tenant: TenantId) -> RepositoryResult<()> {
//!     let employees = repo.list_employees(tenant, &EmployeeFilter::default()).await?;
//!     let holidays = repo.holidays_in_range(tenant, start, end).await?;
//!     Ok(())
//! }
//! ```

pub mod absence;
pub mod error;
pub mod organization;
pub mod replacement;
pub mod schedule;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use absence::AbsenceRepository;
pub use organization::{EmployeeFilter, OrganizationRepository};
pub use replacement::{ReplacementFilter, ReplacementRepository};
pub use schedule::{Page, Pagination, ScheduleFilter, ScheduleRepository};

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type that implements all four
/// repository traits.
pub trait FullRepository:
    ScheduleRepository + OrganizationRepository + AbsenceRepository + ReplacementRepository
{
}

impl<T> FullRepository for T where
    T: ScheduleRepository + OrganizationRepository + AbsenceRepository + ReplacementRepository
{
}
