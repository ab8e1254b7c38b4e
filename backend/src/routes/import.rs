use serde::{Deserialize, Serialize};

// =========================================================
// Bulk import types + routes
// =========================================================

pub const IMPORT_CSV: &str = "/schedules/import/csv";
pub const IMPORT_TEMPLATE: &str = "/schedules/import/template";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRowError {
    /// Spreadsheet row number; the first data row is 2.
    pub row: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matricule: Option<String>,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedEntry {
    pub matricule: String,
    /// The date cell as written, or `start - end` for ranges.
    pub date: String,
    pub shift_code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportResult {
    /// Schedules created.
    pub success: usize,
    /// Rows rejected.
    pub failed: usize,
    pub errors: Vec<ImportRowError>,
    pub imported: Vec<ImportedEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportResponse {
    pub message: String,
    pub data: ImportResult,
}
