//! Replacement request storage.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::error::RepositoryResult;
use crate::models::{Replacement, ReplacementId, ReplacementStatus, TenantId};

#[derive(Debug, Clone, Default)]
pub struct ReplacementFilter {
    pub status: Option<ReplacementStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReplacementFilter {
    pub fn matches(&self, replacement: &Replacement) -> bool {
        self.status.is_none_or(|s| replacement.status == s)
            && self.start_date.is_none_or(|s| replacement.date >= s)
            && self.end_date.is_none_or(|e| replacement.date <= e)
    }
}

#[async_trait]
pub trait ReplacementRepository: Send + Sync {
    async fn insert_replacement(&self, replacement: Replacement) -> RepositoryResult<Replacement>;

    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the id is unknown for the tenant
    async fn update_replacement(&self, replacement: Replacement) -> RepositoryResult<Replacement>;

    async fn find_replacement(
        &self,
        tenant_id: TenantId,
        id: ReplacementId,
    ) -> RepositoryResult<Option<Replacement>>;

    /// Replacements matching `filter`, newest date first, then newest creation first.
    async fn list_replacements(
        &self,
        tenant_id: TenantId,
        filter: &ReplacementFilter,
    ) -> RepositoryResult<Vec<Replacement>>;
}
