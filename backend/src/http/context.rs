//! Per-request tenant and user identity.
//!
//! Every `/v1` route is tenant-scoped. The tenant comes from the
//! `X-Tenant-Id` header; the acting user, when known, from `X-User-Id`.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::error::AppError;
use crate::models::{TenantId, UserId};

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const USER_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    pub tenant_id: TenantId,
    pub user_id: Option<UserId>,
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<Option<&'a str>, AppError> {
    match parts.headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|v| Some(v.trim()).filter(|v| !v.is_empty()))
            .map_err(|_| AppError::BadRequest(format!("En-tête {} invalide", name))),
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tenant_id = header(parts, TENANT_HEADER)?
            .ok_or_else(|| AppError::BadRequest("En-tête X-Tenant-Id manquant".to_string()))?
            .parse::<TenantId>()
            .map_err(|_| AppError::BadRequest("En-tête X-Tenant-Id invalide".to_string()))?;

        let user_id = header(parts, USER_HEADER)?
            .map(|raw| {
                raw.parse::<UserId>()
                    .map_err(|_| AppError::BadRequest("En-tête X-User-Id invalide".to_string()))
            })
            .transpose()?;

        Ok(Self { tenant_id, user_id })
    }
}
