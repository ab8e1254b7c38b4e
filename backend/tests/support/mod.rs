#![allow(dead_code)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::NaiveDate;
use shiftplan::db::LocalRepository;
use shiftplan::models::{EmployeeId, ShiftId, SiteId, TeamId, TenantId};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// ==================== Demo fixture ====================

pub const TENANT: &str = "11111111-1111-4111-8111-111111111111";
pub const SITE: &str = "22222222-2222-4222-8222-222222222222";
pub const TEAM: &str = "44444444-4444-4444-8444-444444444444";
pub const SHIFT_MORNING: &str = "55555555-5555-4555-8555-555555555501";
pub const SHIFT_EVENING: &str = "55555555-5555-4555-8555-555555555502";
pub const SHIFT_NIGHT: &str = "55555555-5555-4555-8555-555555555503";
/// Amina Benali.
pub const EMP001: &str = "66666666-6666-4666-8666-666666666601";
/// Youssef Chraibi.
pub const EMP002: &str = "66666666-6666-4666-8666-666666666602";
/// Sara Idrissi, on approved leave 2026-03-04 to 2026-03-05.
pub const EMP003: &str = "66666666-6666-4666-8666-666666666603";

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/demo.json")
}

/// Fresh repository seeded with the demo tenant (Monday to Saturday
/// working week, recurring 1 May holiday).
pub fn demo_repo() -> LocalRepository {
    LocalRepository::from_fixture_file(fixture_path()).expect("demo fixture should load")
}

pub fn tenant() -> TenantId {
    TENANT.parse().unwrap()
}

pub fn site() -> SiteId {
    SITE.parse().unwrap()
}

pub fn team() -> TeamId {
    TEAM.parse().unwrap()
}

pub fn employee(raw: &str) -> EmployeeId {
    raw.parse().unwrap()
}

pub fn shift(raw: &str) -> ShiftId {
    raw.parse().unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
