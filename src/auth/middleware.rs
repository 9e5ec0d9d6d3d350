//! Authentication extractor
//!
//! Resolves `Authorization: Bearer <token>` to a stored user.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use super::token::verify_token;
use crate::AppState;
use crate::data::User;
use crate::error::AppError;

/// Resolve a bearer token to the user it names
///
/// Fails with 401 when the token is invalid or the user no longer exists.
pub async fn resolve_token(token: &str, state: &AppState) -> Result<User, AppError> {
    let claims = verify_token(token, &state.config.auth.token_secret)?;

    state
        .db
        .get_user_by_username(&claims.sub)
        .await?
        .ok_or_else(AppError::invalid_credentials)
}

/// Extractor for current authenticated user
///
/// # Usage
/// ```ignore
/// async fn handler(
///     CurrentUser(user): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}", user.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<User>().cloned() {
            return Ok(CurrentUser(user));
        }

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthorized("Not authenticated"))?;

        let app_state = AppState::from_ref(state);
        let user = resolve_token(bearer.token(), &app_state).await?;
        parts.extensions.insert(user.clone());

        Ok(CurrentUser(user))
    }
}
