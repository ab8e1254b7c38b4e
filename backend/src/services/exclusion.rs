//! Exclusion chain deciding whether an employee can be planned on a date.
//!
//! Rules run in a fixed order and the first one that fires wins:
//!
//! 1. `JOUR_NON_OUVRABLE`: not a working day of the employee's site (or tenant)
//! 2. `JOUR_FERIE`: holiday, exact or recurring
//! 3. `CONGE`: approved leave
//! 4. `RECUPERATION`: approved or used recovery day
//! 5. `DEJA_PLANIFIE`: a schedule already exists, or was accepted earlier in the batch
//!
//! A [`PlanningContext`] is loaded once per employee and range so the chain
//! runs in memory.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::calendar;
use crate::models::{effective_working_days, Employee, Holiday, Leave, RecoveryDay, TenantId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExclusionReason {
    JourNonOuvrable,
    JourFerie,
    Conge,
    Recuperation,
    DejaPlanifie,
}

impl ExclusionReason {
    pub fn label(self) -> &'static str {
        match self {
            Self::JourNonOuvrable => "Jour non ouvrable",
            Self::JourFerie => "Jour férié",
            Self::Conge => "Congé approuvé",
            Self::Recuperation => "Jour de récupération",
            Self::DejaPlanifie => "Planning déjà existant",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedDate {
    pub date: NaiveDate,
    pub reason: ExclusionReason,
}

/// Which rules of the chain are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExclusionRules {
    pub working_days: bool,
    pub holidays: bool,
    pub leaves: bool,
    pub recovery_days: bool,
    pub existing_schedules: bool,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        Self {
            working_days: true,
            holidays: true,
            leaves: true,
            recovery_days: true,
            existing_schedules: true,
        }
    }
}

impl ExclusionRules {
    /// Only the duplicate check.
    pub fn dedupe_only() -> Self {
        Self {
            working_days: false,
            holidays: false,
            leaves: false,
            recovery_days: false,
            existing_schedules: true,
        }
    }
}

/// Outcome of running the chain over a list of dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub accepted: Vec<NaiveDate>,
    /// Every rejected date with the rule that fired, duplicates included.
    pub excluded: Vec<ExcludedDate>,
}

impl Partition {
    /// Dates rejected because a schedule already existed.
    pub fn already_planned(&self) -> usize {
        self.excluded
            .iter()
            .filter(|e| e.reason == ExclusionReason::DejaPlanifie)
            .count()
    }
}

/// Everything the chain needs for one employee over one range.
#[derive(Debug, Clone, Default)]
pub struct PlanningContext {
    working_days: Vec<u32>,
    holidays: Vec<Holiday>,
    leaves: Vec<Leave>,
    recovery_days: Vec<RecoveryDay>,
    planned: HashSet<NaiveDate>,
}

impl PlanningContext {
    pub fn new(working_days: Vec<u32>) -> Self {
        Self {
            working_days,
            ..Default::default()
        }
    }

    pub fn with_holidays(mut self, holidays: Vec<Holiday>) -> Self {
        self.holidays = holidays;
        self
    }

    pub fn with_leaves(mut self, leaves: Vec<Leave>) -> Self {
        self.leaves = leaves;
        self
    }

    pub fn with_recovery_days(mut self, days: Vec<RecoveryDay>) -> Self {
        self.recovery_days = days;
        self
    }

    pub fn with_planned(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.planned.extend(dates);
        self
    }

    /// Load the context of `employee` for `[start, end]`.
    pub async fn load<R: FullRepository + ?Sized>(
        repo: &R,
        tenant_id: TenantId,
        employee: &Employee,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Self> {
        let settings = repo.tenant_settings(tenant_id).await?;
        let site = match employee.site_id {
            Some(site_id) => repo.find_site(tenant_id, site_id).await?,
            None => None,
        };
        let working_days = effective_working_days(&settings, site.as_ref()).to_vec();

        let holidays = repo.holidays_in_range(tenant_id, start, end).await?;
        let leaves = repo
            .blocking_leaves(tenant_id, Some(employee.id), start, end)
            .await?;
        let recovery_days = repo
            .blocking_recovery_days(tenant_id, Some(employee.id), start, end)
            .await?;
        let existing = repo
            .find_employee_schedules(tenant_id, employee.id, start, end)
            .await?;

        Ok(Self::new(working_days)
            .with_holidays(holidays)
            .with_leaves(leaves)
            .with_recovery_days(recovery_days)
            .with_planned(existing.into_iter().map(|s| s.date)))
    }

    pub fn working_days(&self) -> &[u32] {
        &self.working_days
    }

    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.iter().any(|h| h.matches(date))
    }

    pub fn is_planned(&self, date: NaiveDate) -> bool {
        self.planned.contains(&date)
    }

    pub fn mark_planned(&mut self, date: NaiveDate) {
        self.planned.insert(date);
    }

    /// First rule that excludes `date`, if any.
    pub fn check(&self, date: NaiveDate, rules: &ExclusionRules) -> Option<ExclusionReason> {
        if rules.working_days && !calendar::is_working_day(date, &self.working_days) {
            return Some(ExclusionReason::JourNonOuvrable);
        }
        if rules.holidays && self.is_holiday(date) {
            return Some(ExclusionReason::JourFerie);
        }
        if rules.leaves && self.leaves.iter().any(|l| l.covers(date)) {
            return Some(ExclusionReason::Conge);
        }
        if rules.recovery_days && self.recovery_days.iter().any(|r| r.covers(date)) {
            return Some(ExclusionReason::Recuperation);
        }
        if rules.existing_schedules && self.is_planned(date) {
            return Some(ExclusionReason::DejaPlanifie);
        }
        None
    }

    /// Run the chain over `dates`. Accepted dates are marked planned, so a
    /// date repeated later in the same batch comes out as `DEJA_PLANIFIE`.
    pub fn partition(
        &mut self,
        dates: impl IntoIterator<Item = NaiveDate>,
        rules: &ExclusionRules,
    ) -> Partition {
        let mut out = Partition::default();
        for date in dates {
            match self.check(date, rules) {
                Some(reason) => {
                    debug!(%date, ?reason, "Date excluded");
                    out.excluded.push(ExcludedDate { date, reason });
                }
                None => {
                    self.mark_planned(date);
                    out.accepted.push(date);
                }
            }
        }
        out
    }
}
