//! Service layer: planning rules on top of the repository traits.
//!
//! Services are free async functions generic over
//! [`FullRepository`](crate::db::repository::FullRepository). They validate
//! input, load what they need once, and return DTOs from [`crate::routes`].
//! User-facing messages are in French.

pub mod alerts;
pub mod exclusion;
pub mod import;
pub mod replacements;
pub mod rotation;
pub mod schedules;

#[cfg(test)]
pub(crate) mod test_fixtures;

use chrono::NaiveDate;

use crate::config::SchedulingConfig;
use crate::db::repository::{FullRepository, RepositoryError};
use crate::models::calendar;
use crate::models::{Employee, EmployeeId, Shift, ShiftId, Team, TeamId, TenantId};

/// Error type for service operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Unknown entity, or an entity belonging to another tenant.
    #[error("{0}")]
    NotFound(String),
    /// Invalid input.
    #[error("{0}")]
    BadRequest(String),
    /// Business rule violation (duplicate planning, state transition...).
    #[error("{0}")]
    Conflict(String),
    /// Unexpected failure outside storage (serialization...).
    #[error("{0}")]
    Internal(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Surface storage-level conflicts and misses with their own status
    /// instead of a generic repository failure.
    pub(crate) fn from_storage(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict { message, .. } => Self::Conflict(message),
            RepositoryError::NotFound { message, .. } => Self::NotFound(message),
            other => Self::Repository(other),
        }
    }
}

pub(crate) async fn require_employee<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    id: EmployeeId,
) -> ServiceResult<Employee> {
    repo.find_employee(tenant_id, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Employé non trouvé".to_string()))
}

pub(crate) async fn require_shift<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    id: ShiftId,
) -> ServiceResult<Shift> {
    repo.find_shift(tenant_id, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Shift non trouvé".to_string()))
}

pub(crate) async fn require_team<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    id: TeamId,
) -> ServiceResult<Team> {
    repo.find_team(tenant_id, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Équipe non trouvée".to_string()))
}

/// Check `start <= end` and the configured maximum span.
pub(crate) fn validate_range(
    start: NaiveDate,
    end: NaiveDate,
    limits: &SchedulingConfig,
) -> ServiceResult<()> {
    if end < start {
        return Err(ServiceError::BadRequest(
            "La date de fin doit être supérieure ou égale à la date de début".to_string(),
        ));
    }
    if calendar::span_days(start, end) > limits.max_range_days {
        return Err(ServiceError::BadRequest(format!(
            "L'intervalle ne peut pas dépasser {} jours",
            limits.max_range_days
        )));
    }
    Ok(())
}

/// Parse an optional `HH:mm` field, naming it in the error message.
pub(crate) fn parse_optional_time(
    value: Option<&str>,
    label: &str,
) -> ServiceResult<Option<crate::models::TimeOfDay>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => calendar::parse_time_of_day(raw).map(Some).ok_or_else(|| {
            ServiceError::BadRequest(format!("{} invalide: {}. Format attendu: HH:mm", label, raw))
        }),
    }
}
