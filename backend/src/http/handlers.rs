//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic. Extractor rejections are turned into
//! the JSON error body instead of axum's plain-text default.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};

use super::context::RequestContext;
use super::dto::{
    AlertsQuery, BulkCreateResponse, BulkDeleteRequest, BulkDeleteResponse, BulkScheduleRequest,
    CreateReplacementRequest, CreateScheduleRequest, CreateScheduleResponse,
    GenerateRotationRequest, HealthResponse, ImportResponse, LegalAlert, MessageResponse,
    PlanningView, ReplacementQuery, ReplacementSuggestion, ReplacementView,
    RotationPreviewRequest, RotationPreviewResponse, RotationResult, ScheduleListResponse,
    ScheduleQuery, ScheduleView, SuggestionsQuery, UpdateScheduleRequest, ViewFilter,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::calendar;
use crate::models::{ReplacementId, ScheduleId};
use crate::services::{alerts, import, replacements, rotation, schedules};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Result type for handlers answering `201 Created`.
pub type CreatedResult<T> = Result<(StatusCode, Json<T>), AppError>;

fn path_date(raw: &str) -> Result<NaiveDate, AppError> {
    calendar::parse_flexible_date(raw)
        .ok_or_else(|| AppError::BadRequest(format!("Date invalide: {}", raw)))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and storage is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let storage = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        storage,
    }))
}

// =============================================================================
// Schedule CRUD
// =============================================================================

/// POST /v1/schedules
pub async fn create_schedule(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Result<Json<CreateScheduleRequest>, JsonRejection>,
) -> CreatedResult<CreateScheduleResponse> {
    let Json(req) = body?;
    let res = schedules::create(
        state.repository.as_ref(),
        ctx.tenant_id,
        req,
        ctx.user_id,
        &state.config.scheduling,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(res)))
}

/// POST /v1/schedules/bulk
pub async fn create_schedules_bulk(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Result<Json<BulkScheduleRequest>, JsonRejection>,
) -> CreatedResult<BulkCreateResponse> {
    let Json(req) = body?;
    let res = schedules::create_bulk(
        state.repository.as_ref(),
        ctx.tenant_id,
        req.schedules,
        ctx.user_id,
        &state.config.scheduling,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(res)))
}

/// GET /v1/schedules
///
/// Paginated, filtered schedule list.
pub async fn list_schedules(
    State(state): State<AppState>,
    ctx: RequestContext,
    query: Result<Query<ScheduleQuery>, QueryRejection>,
) -> HandlerResult<ScheduleListResponse> {
    let Query(query) = query?;
    let res = schedules::find_all(
        state.repository.as_ref(),
        ctx.tenant_id,
        query,
        &state.config.scheduling,
    )
    .await?;
    Ok(Json(res))
}

/// GET /v1/schedules/{id}
pub async fn get_schedule(
    State(state): State<AppState>,
    ctx: RequestContext,
    id: Result<Path<ScheduleId>, PathRejection>,
) -> HandlerResult<ScheduleView> {
    let Path(id) = id?;
    let view = schedules::find_one(state.repository.as_ref(), ctx.tenant_id, id).await?;
    Ok(Json(view))
}

/// PATCH /v1/schedules/{id}
pub async fn update_schedule(
    State(state): State<AppState>,
    ctx: RequestContext,
    id: Result<Path<ScheduleId>, PathRejection>,
    body: Result<Json<UpdateScheduleRequest>, JsonRejection>,
) -> HandlerResult<ScheduleView> {
    let Path(id) = id?;
    let Json(req) = body?;
    let view = schedules::update(state.repository.as_ref(), ctx.tenant_id, id, req).await?;
    Ok(Json(view))
}

/// DELETE /v1/schedules/{id}
pub async fn delete_schedule(
    State(state): State<AppState>,
    ctx: RequestContext,
    id: Result<Path<ScheduleId>, PathRejection>,
) -> HandlerResult<MessageResponse> {
    let Path(id) = id?;
    schedules::remove(state.repository.as_ref(), ctx.tenant_id, id).await?;
    Ok(Json(MessageResponse {
        message: "Planning supprimé avec succès".to_string(),
    }))
}

/// DELETE /v1/schedules/bulk
pub async fn delete_schedules_bulk(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Result<Json<BulkDeleteRequest>, JsonRejection>,
) -> HandlerResult<BulkDeleteResponse> {
    let Json(req) = body?;
    let res = schedules::remove_bulk(state.repository.as_ref(), ctx.tenant_id, req.ids).await?;
    Ok(Json(res))
}

// =============================================================================
// Planning Views
// =============================================================================

/// GET /v1/schedules/week/{date}
pub async fn week_view(
    State(state): State<AppState>,
    ctx: RequestContext,
    date: Result<Path<String>, PathRejection>,
    filter: Result<Query<ViewFilter>, QueryRejection>,
) -> HandlerResult<PlanningView> {
    let Path(raw) = date?;
    let Query(filter) = filter?;
    let view = schedules::week_view(
        state.repository.as_ref(),
        ctx.tenant_id,
        path_date(&raw)?,
        filter,
    )
    .await?;
    Ok(Json(view))
}

/// GET /v1/schedules/month/{date}
pub async fn month_view(
    State(state): State<AppState>,
    ctx: RequestContext,
    date: Result<Path<String>, PathRejection>,
    filter: Result<Query<ViewFilter>, QueryRejection>,
) -> HandlerResult<PlanningView> {
    let Path(raw) = date?;
    let Query(filter) = filter?;
    let view = schedules::month_view(
        state.repository.as_ref(),
        ctx.tenant_id,
        path_date(&raw)?,
        filter,
    )
    .await?;
    Ok(Json(view))
}

// =============================================================================
// Legal Alerts
// =============================================================================

/// GET /v1/schedules/alerts
///
/// Defaults to the current ISO week when no window is given.
pub async fn get_alerts(
    State(state): State<AppState>,
    ctx: RequestContext,
    query: Result<Query<AlertsQuery>, QueryRejection>,
) -> HandlerResult<Vec<LegalAlert>> {
    let Query(query) = query?;
    let (start, end) = alerts::resolve_window(&query, Utc::now().date_naive());
    let res = alerts::generate_alerts(
        state.repository.as_ref(),
        ctx.tenant_id,
        start,
        end,
        &state.config.scheduling,
    )
    .await?;
    Ok(Json(res))
}

// =============================================================================
// Rotation
// =============================================================================

/// POST /v1/schedules/rotation/preview
pub async fn preview_rotation(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Result<Json<RotationPreviewRequest>, JsonRejection>,
) -> HandlerResult<RotationPreviewResponse> {
    let Json(req) = body?;
    let res = rotation::preview(
        state.repository.as_ref(),
        ctx.tenant_id,
        req,
        &state.config.scheduling,
    )
    .await?;
    Ok(Json(res))
}

/// POST /v1/schedules/rotation/generate
pub async fn generate_rotation(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Result<Json<GenerateRotationRequest>, JsonRejection>,
) -> CreatedResult<RotationResult> {
    let Json(req) = body?;
    let res = rotation::generate(
        state.repository.as_ref(),
        ctx.tenant_id,
        req,
        ctx.user_id,
        &state.config.scheduling,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(res)))
}

// =============================================================================
// Replacements
// =============================================================================

/// POST /v1/schedules/replacements
pub async fn create_replacement(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Result<Json<CreateReplacementRequest>, JsonRejection>,
) -> CreatedResult<ReplacementView> {
    let Json(req) = body?;
    let view =
        replacements::create(state.repository.as_ref(), ctx.tenant_id, req, ctx.user_id).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /v1/schedules/replacements
pub async fn list_replacements(
    State(state): State<AppState>,
    ctx: RequestContext,
    query: Result<Query<ReplacementQuery>, QueryRejection>,
) -> HandlerResult<Vec<ReplacementView>> {
    let Query(query) = query?;
    let res = replacements::list(state.repository.as_ref(), ctx.tenant_id, query).await?;
    Ok(Json(res))
}

/// GET /v1/schedules/replacements/suggestions
pub async fn replacement_suggestions(
    State(state): State<AppState>,
    ctx: RequestContext,
    query: Result<Query<SuggestionsQuery>, QueryRejection>,
) -> HandlerResult<Vec<ReplacementSuggestion>> {
    let Query(query) = query?;
    let res = replacements::suggestions(
        state.repository.as_ref(),
        ctx.tenant_id,
        query,
        &state.config.scheduling,
    )
    .await?;
    Ok(Json(res))
}

/// PATCH /v1/schedules/replacements/{id}/approve
pub async fn approve_replacement(
    State(state): State<AppState>,
    ctx: RequestContext,
    id: Result<Path<ReplacementId>, PathRejection>,
) -> HandlerResult<ReplacementView> {
    let Path(id) = id?;
    let view =
        replacements::approve(state.repository.as_ref(), ctx.tenant_id, id, ctx.user_id).await?;
    Ok(Json(view))
}

/// PATCH /v1/schedules/replacements/{id}/reject
pub async fn reject_replacement(
    State(state): State<AppState>,
    ctx: RequestContext,
    id: Result<Path<ReplacementId>, PathRejection>,
) -> HandlerResult<ReplacementView> {
    let Path(id) = id?;
    let view =
        replacements::reject(state.repository.as_ref(), ctx.tenant_id, id, ctx.user_id).await?;
    Ok(Json(view))
}

// =============================================================================
// CSV Import
// =============================================================================

/// POST /v1/schedules/import/csv
///
/// The body is the raw CSV text.
pub async fn import_csv(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: String,
) -> HandlerResult<ImportResponse> {
    let res = import::import_csv(
        state.repository.as_ref(),
        ctx.tenant_id,
        &body,
        ctx.user_id,
        &state.config.scheduling,
    )
    .await?;
    Ok(Json(res))
}

/// GET /v1/schedules/import/template
pub async fn import_template() -> Result<impl IntoResponse, AppError> {
    let csv = import::import_template()?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"template_import_plannings.csv\"",
            ),
        ],
        csv,
    ))
}
