use axum::{
    extract::{Json as JsonExtract, State},
    response::{IntoResponse, Json},
};
use serde::Serialize;

use super::api::GenericResponse;
use crate::{
    auth_middleware::CurrentUser,
    error::AppError,
    models::{LoginForm, User},
    AppState,
};

#[derive(Serialize)]
struct LoginResponse {
    success: bool,
    user: Option<User>,
}

// Handler for POST /login
pub async fn handle_login(
    State(app_state): State<AppState>,
    JsonExtract(form): JsonExtract<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    if form.email.trim().is_empty() {
        return Err(AppError::BadRequest("Email is required".into()));
    }
    tracing::info!("Sign-in attempt for {}", form.email);

    if app_state.parking.login(&form.email, &form.password).await {
        let user = app_state.parking.current_user().await;
        Ok(Json(LoginResponse { success: true, user }))
    } else {
        Err(AppError::Unauthorized("Invalid email or password".into()))
    }
}

// Handler for POST /logout; also drops any unpaid booking
pub async fn handle_logout(State(app_state): State<AppState>) -> impl IntoResponse {
    app_state.parking.logout().await;
    Json(GenericResponse::message("Signed out."))
}

pub async fn get_me(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    Json(user)
}
