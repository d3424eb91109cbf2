use axum::http::HeaderMap;

use crate::auth::{self, AuthError, Principal};
use crate::state::AppState;

/// Scope guard for protected routes.
///
/// Validates the bearer token against the provider's published keys, checks
/// that the required permission was granted, and yields the request's
/// principal to the handler. Every failure is one of the typed `AuthError`
/// kinds, so the error translator maps it to the right 401/403.
pub async fn require_scope(
    state: &AppState,
    headers: &HeaderMap,
    required: &str,
) -> Result<Principal, AuthError> {
    let token = auth::extract_bearer(headers)?;
    let claims = state.verifier.verify(token).await?;
    state.verifier.check_scope(claims, required)
}
