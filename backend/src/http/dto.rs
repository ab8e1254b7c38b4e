//! Data Transfer Objects for the HTTP API.
//!
//! Request and response bodies live next to their routes and are re-exported
//! here; only the HTTP-specific envelopes are defined in this file.

use serde::{Deserialize, Serialize};

pub use crate::api::{
    // Schedules
    BulkCreateResponse, BulkDeleteRequest, BulkDeleteResponse, BulkScheduleRequest,
    CreateScheduleRequest, CreateScheduleResponse, PlanningView, ScheduleListResponse,
    ScheduleQuery, ScheduleView, UpdateScheduleRequest, ViewFilter,
    // Alerts
    AlertsQuery, LegalAlert,
    // Rotation
    GenerateRotationRequest, RotationPreviewRequest, RotationPreviewResponse, RotationResult,
    // Replacements
    CreateReplacementRequest, ReplacementQuery, ReplacementSuggestion, ReplacementView,
    SuggestionsQuery,
    // Import
    ImportResponse,
};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// API version
    pub version: String,
    /// Storage connection status
    pub storage: String,
}

/// Plain confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
