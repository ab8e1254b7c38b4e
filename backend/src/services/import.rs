//! Bulk schedule import from CSV text.
//!
//! Columns, in order: matricule, start date, end date, shift code, start
//! time, end time, team code, notes. The first line is a header. A row
//! covers every date of its range; dates the employee already holds are
//! skipped, and a row with nothing left to create is reported as failed.
//! Other rows keep going when one fails.

use chrono::NaiveDate;
use tracing::{info, warn};

use super::exclusion::{ExclusionRules, PlanningContext};
use super::{parse_optional_time, validate_range, ServiceError, ServiceResult};
use crate::config::SchedulingConfig;
use crate::db::repository::FullRepository;
use crate::models::calendar;
use crate::models::{Schedule, TenantId, UserId};
use crate::routes::import::{ImportResponse, ImportResult, ImportRowError, ImportedEntry};

pub const TEMPLATE_HEADER: [&str; 8] = [
    "Matricule",
    "Date Début",
    "Date Fin",
    "Code Shift",
    "Heure Début",
    "Heure Fin",
    "Code Équipe",
    "Notes",
];

const TEMPLATE_ROWS: [[&str; 8]; 3] = [
    ["EMP001", "15/01/2025", "", "M", "08:00", "16:00", "TEAM001", "Une journée"],
    ["EMP002", "15/01/2025", "31/01/2025", "S", "14:00", "22:00", "", "Intervalle de dates"],
    ["EMP001", "01/02/2025", "28/02/2025", "M", "", "", "TEAM001", "Tout le mois"],
];

const DATE_FORMAT_HINT: &str = "Format attendu: DD/MM/YYYY ou YYYY-MM-DD";

/// One data row, cells trimmed, blanks as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRow {
    pub matricule: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub shift_code: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub team_code: Option<String>,
    pub notes: Option<String>,
}

impl ImportRow {
    fn from_record(record: &csv::StringRecord) -> Self {
        let cell = |i: usize| {
            record
                .get(i)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            matricule: cell(0),
            start_date: cell(1),
            end_date: cell(2),
            shift_code: cell(3),
            start_time: cell(4),
            end_time: cell(5),
            team_code: cell(6),
            notes: cell(7),
        }
    }

    fn is_blank(&self) -> bool {
        *self == Self::default()
    }
}

/// Semicolon-separated exports are common from French spreadsheets.
fn detect_delimiter(body: &str) -> u8 {
    let header = body.lines().next().unwrap_or_default();
    if header.contains(';') && !header.contains(',') {
        b';'
    } else {
        b','
    }
}

fn parse_date(raw: &str, label: &str) -> ServiceResult<NaiveDate> {
    calendar::parse_flexible_date(raw).ok_or_else(|| {
        ServiceError::BadRequest(format!("{} invalide: {}. {}", label, raw, DATE_FORMAT_HINT))
    })
}

fn missing(message: &str) -> ServiceError {
    ServiceError::BadRequest(message.to_string())
}

/// Validate and plan one row. Returns the number of schedules created.
async fn import_row<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    row: &ImportRow,
    user: Option<UserId>,
    limits: &SchedulingConfig,
) -> ServiceResult<(usize, ImportedEntry)> {
    let matricule = row
        .matricule
        .as_deref()
        .ok_or_else(|| missing("Matricule manquant"))?;
    let raw_start = row
        .start_date
        .as_deref()
        .ok_or_else(|| missing("Date de début manquante"))?;
    let shift_code = row
        .shift_code
        .as_deref()
        .ok_or_else(|| missing("Code shift manquant"))?;

    let start = parse_date(raw_start, "Date de début")?;
    let end = match row.end_date.as_deref() {
        Some(raw) => parse_date(raw, "Date de fin")?,
        None => start,
    };
    validate_range(start, end, limits)?;

    let employee = repo
        .find_employee_by_matricule(tenant_id, matricule)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Employé avec matricule {} introuvable", matricule))
        })?;
    let shift = repo
        .find_shift_by_code(tenant_id, shift_code)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Shift avec code {} introuvable", shift_code)))?;
    let team = match row.team_code.as_deref() {
        Some(code) => Some(repo.find_team_by_code(tenant_id, code).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("Équipe avec code {} introuvable", code))
        })?),
        None => None,
    };
    let start_time = parse_optional_time(row.start_time.as_deref(), "Heure début")?;
    let end_time = parse_optional_time(row.end_time.as_deref(), "Heure fin")?;

    let mut ctx = PlanningContext::load(repo, tenant_id, &employee, start, end).await?;
    let partition = ctx.partition(calendar::date_range(start, end), &ExclusionRules::dedupe_only());
    if partition.accepted.is_empty() {
        return Err(ServiceError::Conflict(
            "Tous les plannings pour cette période existent déjà".to_string(),
        ));
    }

    let schedules: Vec<Schedule> = partition
        .accepted
        .iter()
        .map(|date| {
            Schedule::new(tenant_id, employee.id, shift.id, *date)
                .with_team(team.as_ref().map(|t| t.id))
                .with_custom_times(start_time, end_time)
                .with_notes(row.notes.clone())
                .created_by(user)
        })
        .collect();
    let created = repo.insert_schedules(schedules).await?;

    let date = match row.end_date.as_deref() {
        Some(raw_end) if end != start => format!("{} - {}", raw_start, raw_end),
        _ => raw_start.to_string(),
    };
    Ok((
        created,
        ImportedEntry {
            matricule: employee.matricule.clone(),
            date,
            shift_code: shift.code.clone(),
        },
    ))
}

/// Import every row of a CSV body.
///
/// Storage failures abort the import; validation failures are collected per
/// row with its spreadsheet line number.
pub async fn import_csv<R: FullRepository + ?Sized>(
    repo: &R,
    tenant_id: TenantId,
    body: &str,
    user: Option<UserId>,
    limits: &SchedulingConfig,
) -> ServiceResult<ImportResponse> {
    if body.trim().is_empty() {
        return Err(ServiceError::BadRequest(
            "Erreur lors de la lecture du fichier: fichier vide".to_string(),
        ));
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(detect_delimiter(body))
        .from_reader(body.trim_start_matches('\u{feff}').as_bytes());

    let mut result = ImportResult::default();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            ServiceError::BadRequest(format!("Erreur lors de la lecture du fichier: {}", e))
        })?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + 2);
        let row = ImportRow::from_record(&record);
        if row.is_blank() {
            continue;
        }

        match import_row(repo, tenant_id, &row, user, limits).await {
            Ok((created, entry)) => {
                result.success += created;
                result.imported.push(entry);
            }
            Err(ServiceError::Repository(err)) => return Err(ServiceError::Repository(err)),
            Err(err) => {
                warn!(line, error = %err, "Import row rejected");
                result.failed += 1;
                result.errors.push(ImportRowError {
                    row: line,
                    matricule: row.matricule.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    info!(
        created = result.success,
        failed = result.failed,
        "CSV import finished"
    );
    Ok(ImportResponse {
        message: format!(
            "Import terminé: {} planning(s) importé(s), {} échec(s)",
            result.success, result.failed
        ),
        data: result,
    })
}

/// CSV template with the expected header and example rows.
pub fn import_template() -> ServiceResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let to_internal = |e: csv::Error| ServiceError::Internal(e.to_string());
    writer.write_record(TEMPLATE_HEADER).map_err(to_internal)?;
    for row in TEMPLATE_ROWS {
        writer.write_record(row).map_err(to_internal)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ServiceError::Internal(e.to_string()))
}

#[cfg(test)]
#[path = "import_tests.rs"]
mod import_tests;
