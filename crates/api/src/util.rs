use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::ApiError;

/// Pull the token out of an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively. Any other shape is rejected
/// with 401 so protected handlers never see a partial credential.
pub fn require_bearer(headers: &HeaderMap) -> Result<String, ApiError> {
    let not_authenticated = || ApiError::unauthorized("Not authenticated");

    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(not_authenticated)?
        .to_str()
        .map_err(|_| not_authenticated())?;

    match header.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = token.trim();
            if token.is_empty() || token.contains(' ') {
                Err(not_authenticated())
            } else {
                Ok(token.to_owned())
            }
        }
        _ => Err(not_authenticated()),
    }
}
