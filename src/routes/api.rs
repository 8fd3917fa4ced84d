// Handlers for backend API endpoints

use axum::{
    extract::{Json as JsonExtract, Path, Query, State},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};

use crate::{
    auth_middleware::{AdminUser, CurrentUser},
    catalog::{SortDirection, SortField},
    error::AppError,
    format::format_amount,
    hold,
    models::{ParkingFilter, ParkingLot, PaymentMethod, Transaction},
    AppState,
};

// --- Response Wrappers ---

#[derive(Serialize)]
pub struct GenericResponse {
    success: bool,
    message: Option<String>,
    id: Option<String>,
    error: Option<String>,
}

impl GenericResponse {
    pub fn message(message: &str) -> Self {
        GenericResponse {
            success: true,
            message: Some(message.to_string()),
            id: None,
            error: None,
        }
    }

    fn with_id(message: &str, id: String) -> Self {
        GenericResponse { id: Some(id), ..Self::message(message) }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptResponse {
    success: bool,
    receipt: Transaction,
    display_total: String,
}

// --- Request Structs ---

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SelectLotRequest {
    lot_id: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    spot_id: String,
    duration: u32,
}

#[derive(Deserialize, Debug)]
pub struct PaymentRequest {
    method: PaymentMethod,
}

#[derive(Deserialize, Debug)]
pub struct AdminTableQuery {
    q: Option<String>,
    sort: Option<SortField>,
    dir: Option<SortDirection>,
}

// --- API Handlers ---

pub async fn get_state(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.parking.snapshot().await)
}

pub async fn get_lots(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.parking.parking_lots().await)
}

pub async fn get_filtered_lots(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.parking.filtered_parking_lots().await)
}

pub async fn get_filter(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.parking.filter().await)
}

pub async fn set_filter(
    State(app_state): State<AppState>,
    JsonExtract(criteria): JsonExtract<ParkingFilter>,
) -> impl IntoResponse {
    let filtered = app_state.parking.set_filter(criteria).await;
    tracing::info!("[HANDLER] /api/filter - {} lots match", filtered.len());
    Json(filtered)
}

pub async fn refresh_catalog(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    // Run detached so a dropped request can't leave the loading flag raised
    let parking = app_state.parking.clone();
    let outcome = tokio::spawn(async move { parking.refresh_catalog().await })
        .await
        .map_err(|e| AppError::InternalServerError(anyhow::Error::new(e).context("Catalog refresh task failed")))?;
    outcome?;
    Ok(Json(app_state.parking.statistics().await))
}

pub async fn get_statistics(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.parking.statistics().await)
}

pub async fn get_selection(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.parking.selected_lot().await)
}

pub async fn set_selection(
    State(app_state): State<AppState>,
    JsonExtract(request): JsonExtract<SelectLotRequest>,
) -> impl IntoResponse {
    Json(app_state.parking.select_lot(request.lot_id.as_deref()).await)
}

pub async fn get_booking(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.parking.booking().await)
}

pub async fn create_booking(
    State(app_state): State<AppState>,
    JsonExtract(request): JsonExtract<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = app_state
        .parking
        .create_booking(&request.spot_id, request.duration)
        .await?;

    hold::spawn_hold(app_state.parking.clone(), booking.id, app_state.settings.booking_hold());
    Ok(Json(booking))
}

pub async fn clear_booking(State(app_state): State<AppState>) -> impl IntoResponse {
    if app_state.parking.clear_booking().await {
        Json(GenericResponse::message("Booking cancelled."))
    } else {
        Json(GenericResponse::message("No booking to cancel."))
    }
}

pub async fn complete_payment(
    State(app_state): State<AppState>,
    JsonExtract(request): JsonExtract<PaymentRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("API call: complete_payment via {:?}", request.method);
    match app_state.parking.complete_payment(request.method).await {
        Some(receipt_id) => Ok(Json(GenericResponse::with_id("Payment successful.", receipt_id))),
        None => Err(AppError::BadRequest("No pending booking to pay for".into())),
    }
}

pub async fn get_receipt(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(receipt_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let receipt = app_state
        .parking
        .receipt(&receipt_id)
        .await
        .filter(|t| t.user_id == user.id)
        .ok_or_else(|| AppError::NotFound(format!("Receipt {} not found", receipt_id)))?;

    let display_total = format_amount(receipt.amount, user.uses_indian_format());
    Ok(Json(ReceiptResponse { success: true, receipt, display_total }))
}

pub async fn get_history(
    State(app_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    Json(app_state.parking.transactions_for(&user.id).await)
}

pub async fn get_admin_lots(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(query): Query<AdminTableQuery>,
) -> impl IntoResponse {
    tracing::info!("API call: admin lots for {} with {:?}", admin.id, query);
    let rows = app_state
        .parking
        .admin_lots(
            query.q.as_deref().unwrap_or(""),
            query.sort.unwrap_or_default(),
            query.dir.unwrap_or_default(),
        )
        .await;
    Json(rows)
}

pub async fn update_lot(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(lot_id): Path<String>,
    JsonExtract(lot): JsonExtract<ParkingLot>,
) -> Result<impl IntoResponse, AppError> {
    if lot.id != lot_id {
        return Err(AppError::BadRequest(format!(
            "Lot id {} does not match the path {}",
            lot.id, lot_id
        )));
    }
    tracing::info!("[HANDLER] /api/admin/lots/{} - edit by {}", lot_id, admin.id);

    if !app_state.parking.update_parking_lot(lot).await {
        return Err(AppError::NotFound(format!("Parking lot {} not found", lot_id)));
    }
    let updated = app_state
        .parking
        .parking_lots()
        .await
        .into_iter()
        .find(|l| l.id == lot_id)
        .ok_or_else(|| AppError::NotFound(format!("Parking lot {} not found", lot_id)))?;
    Ok(Json(updated))
}
