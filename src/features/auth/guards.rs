//! Role-based authorization guards.
//!
//! Role tiers (from highest to lowest):
//! - Admin: may edit map features directly and report hazards
//! - SpecialUser: same map permissions as Admin
//! - User: may report hazards
//!
//! Guards read the `SessionUser` inserted by the auth middleware.

use crate::core::error::AppError;
use crate::features::auth::model::SessionUser;
use axum::{extract::FromRequestParts, http::request::Parts};

fn session_user(parts: &Parts) -> Result<SessionUser, AppError> {
    parts
        .extensions
        .get::<SessionUser>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))
}

/// Guard for hazard reporting. Any signed-in role passes.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireReporter(user): RequireReporter) { ... }
/// ```
pub struct RequireReporter(pub SessionUser);

impl<S> FromRequestParts<S> for RequireReporter
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = session_user(parts)?;

        if !user.can_report_hazards() {
            return Err(AppError::Forbidden(
                "Hazard reporting access required".to_string(),
            ));
        }

        Ok(RequireReporter(user))
    }
}

/// Guard for map editing. Allows `Admin` and `SpecialUser`.
pub struct RequireEditor(pub SessionUser);

impl<S> FromRequestParts<S> for RequireEditor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = session_user(parts)?;

        if !user.can_edit_features() {
            return Err(AppError::Forbidden("Editor access required".to_string()));
        }

        Ok(RequireEditor(user))
    }
}
