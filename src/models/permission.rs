//! Permission check request/response models

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::services::access_policy::Action;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionCheckRequest {
    pub role: Option<String>,
    pub resource: Option<String>,
    pub action: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionCheckResponse {
    pub allowed: bool,
}

/// Everything a role may do, keyed by resource
#[derive(Debug, Clone, Serialize)]
pub struct RolePermissionsResponse {
    pub role: String,
    pub resources: BTreeMap<String, Vec<Action>>,
}
