// src/api/auth.rs
// Request authentication. The platform gateway terminates the real session
// and forwards the caller's identity in the x-user-id header; this extractor
// resolves it to a user row.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::api::error::{ApiError, IntoApiError};
use crate::domain::{self, User};
use crate::state::AppState;

pub struct AuthUser(pub User);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Missing x-user-id header"))?;

        let user = domain::find_user(&state.db, user_id)
            .await
            .api_error("Failed to look up user")?
            .ok_or_else(|| ApiError::unauthorized("Unknown user"))?;

        Ok(AuthUser(user))
    }
}
