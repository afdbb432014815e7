//! Caller identity
//!
//! Authentication happens upstream at the hosted auth provider; requests
//! reach this service with the verified user id and role in headers.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::access_policy::{Action, PermissionTable, Role};

pub const HEADER_USER_ID: &str = "x-user-id";
pub const HEADER_USER_ROLE: &str = "x-user-role";

/// Authenticated caller of a CRUD endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fail with 403 unless the policy grants `action` on `resource`
    pub fn authorize(
        &self,
        permissions: &PermissionTable,
        resource: &str,
        action: Action,
    ) -> Result<(), ApiError> {
        if permissions.has_permission(Some(self.role), resource, action) {
            Ok(())
        } else {
            tracing::warn!(
                user_id = %self.user_id,
                role = %self.role,
                resource,
                action = %action,
                "Permission denied"
            );
            Err(ApiError::Forbidden(format!(
                "Role {} may not {} {}",
                self.role, action, resource
            )))
        }
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header(parts, HEADER_USER_ID)
            .ok_or_else(|| ApiError::Unauthorized(format!("Missing {} header", HEADER_USER_ID)))?;
        let user_id = Uuid::parse_str(user_id)
            .map_err(|_| ApiError::Unauthorized(format!("Invalid {} header", HEADER_USER_ID)))?;

        let role = header(parts, HEADER_USER_ROLE).ok_or_else(|| {
            ApiError::Unauthorized(format!("Missing {} header", HEADER_USER_ROLE))
        })?;
        let role: Role = role
            .parse()
            .map_err(|e: String| ApiError::Unauthorized(e))?;

        Ok(Caller { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> Result<Caller, ApiError> {
        let (mut parts, _) = req.into_parts();
        Caller::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_caller() {
        let id = Uuid::new_v4();
        let req = Request::builder()
            .header(HEADER_USER_ID, id.to_string())
            .header(HEADER_USER_ROLE, "buyer")
            .body(())
            .unwrap();

        let caller = extract(req).await.unwrap();
        assert_eq!(caller.user_id, id);
        assert_eq!(caller.role, Role::Customer);
    }

    #[tokio::test]
    async fn test_rejects_missing_and_invalid_headers() {
        let missing = Request::builder().body(()).unwrap();
        assert!(matches!(extract(missing).await, Err(ApiError::Unauthorized(_))));

        let bad_id = Request::builder()
            .header(HEADER_USER_ID, "not-a-uuid")
            .header(HEADER_USER_ROLE, "admin")
            .body(())
            .unwrap();
        assert!(matches!(extract(bad_id).await, Err(ApiError::Unauthorized(_))));

        let bad_role = Request::builder()
            .header(HEADER_USER_ID, Uuid::new_v4().to_string())
            .header(HEADER_USER_ROLE, "superuser")
            .body(())
            .unwrap();
        assert!(matches!(extract(bad_role).await, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_authorize() {
        let table = PermissionTable::default();
        let customer = Caller {
            user_id: Uuid::new_v4(),
            role: Role::Customer,
        };

        assert!(customer.authorize(&table, "orders", Action::Create).is_ok());
        assert!(matches!(
            customer.authorize(&table, "orders", Action::Delete),
            Err(ApiError::Forbidden(_))
        ));
    }
}
