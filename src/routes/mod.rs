// Route definitions

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::AppState;

mod api;
mod auth;

pub fn create_router(app_state: AppState) -> Router {
    let api_router = Router::new()
        .route("/state", get(api::get_state))
        .route("/lots", get(api::get_lots))
        .route("/lots/filtered", get(api::get_filtered_lots))
        .route("/filter", get(api::get_filter).put(api::set_filter))
        .route("/refresh", post(api::refresh_catalog))
        .route("/statistics", get(api::get_statistics))
        .route("/selection", get(api::get_selection).put(api::set_selection))
        .route(
            "/booking",
            get(api::get_booking)
                .post(api::create_booking)
                .delete(api::clear_booking),
        )
        .route("/payment", post(api::complete_payment))
        // Routes requiring a signed-in user
        .route("/me", get(auth::get_me))
        .route("/receipts/:id", get(api::get_receipt))
        .route("/history", get(api::get_history))
        // Admin only
        .route("/admin/lots", get(api::get_admin_lots))
        .route("/admin/lots/:id", put(api::update_lot))
        .with_state(app_state.clone());

    Router::new()
        .route("/login", post(auth::handle_login))
        .route("/logout", post(auth::handle_logout))
        .nest("/api", api_router)
        .with_state(app_state)
}
