use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use std::collections::BTreeMap;

use crate::error::ApiError;
use crate::models::permission::{
    PermissionCheckRequest, PermissionCheckResponse, RolePermissionsResponse,
};
use crate::services::access_policy::Role;
use crate::AppState;

/// POST /api/permissions/check
///
/// Never fails: missing fields, unknown roles or a malformed body are a deny.
pub async fn check_permission(
    State(state): State<AppState>,
    payload: Result<Json<PermissionCheckRequest>, JsonRejection>,
) -> Json<PermissionCheckResponse> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();

    let allowed = state.permissions.has_permission_str(
        request.role.as_deref(),
        request.resource.as_deref(),
        request.action.as_deref(),
    );

    tracing::debug!(
        role = ?request.role,
        resource = ?request.resource,
        action = ?request.action,
        allowed,
        "Permission check"
    );

    Json(PermissionCheckResponse { allowed })
}

/// GET /api/permissions/{role}
///
/// Resource -> actions map used by the dashboard to hide screens.
pub async fn get_role_permissions(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> Result<Json<RolePermissionsResponse>, ApiError> {
    let role: Role = role.parse().map_err(ApiError::Validation)?;

    let resources: BTreeMap<String, Vec<_>> = state
        .permissions
        .resources()
        .map(|resource| (resource.to_string(), state.permissions.allowed_actions(role, resource)))
        .filter(|(_, actions)| !actions.is_empty())
        .collect();

    Ok(Json(RolePermissionsResponse {
        role: role.to_string(),
        resources,
    }))
}
