use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::{
    error::AppError,
    models::{Role, User},
    AppState,
};

// --- Axum Extractors ---

// Extracted in handlers that need a signed-in session
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

// Like CurrentUser, but only for sessions with the admin role
#[derive(Clone, Debug)]
pub struct AdminUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    AppState: FromRef<S>, // Require that AppState can be extracted from S
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let user = app_state.parking.current_user().await.ok_or_else(|| {
            warn!("No signed-in user for {}", parts.uri.path());
            AppError::Unauthorized("Sign in required".into())
        })?;

        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if user.role != Role::Admin {
            warn!("User {} attempted to access admin route {}", user.id, parts.uri.path());
            return Err(AppError::Forbidden("Admin access required".into()));
        }

        Ok(AdminUser(user))
    }
}
