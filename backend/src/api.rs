//! Public API surface of the planning engine.
//!
//! This file consolidates the request and response types exchanged with
//! clients. All types derive Serialize/Deserialize for JSON serialization.

pub use crate::routes::alerts::{AlertKind, AlertSeverity, AlertsQuery, LegalAlert};
pub use crate::routes::import::{ImportResponse, ImportResult, ImportRowError, ImportedEntry};
pub use crate::routes::replacements::{
    CreateReplacementRequest, ReplacementQuery, ReplacementSuggestion, ReplacementView,
    SuggestionsQuery,
};
pub use crate::routes::rotation::{
    EmployeeRotation, EmployeeRotationPreview, EmployeeRotationResult, GenerateRotationRequest,
    RotationDay, RotationPreviewRequest, RotationPreviewResponse, RotationResult,
};
pub use crate::routes::schedules::{
    BulkCreateResponse, BulkDeleteRequest, BulkDeleteResponse, BulkScheduleRequest,
    CreateScheduleRequest, CreateScheduleResponse, DateRange, EmployeeSummary, PageMeta,
    PlanningView, ScheduleListResponse, ScheduleQuery, ScheduleView, UpdateScheduleRequest,
    ViewFilter,
};
pub use crate::services::exclusion::{ExcludedDate, ExclusionReason};

pub use crate::models::{
    EmployeeId, ReplacementId, ReplacementStatus, ScheduleId, ScheduleStatus, ShiftId, SiteId,
    TeamId, TenantId, UserId,
};
