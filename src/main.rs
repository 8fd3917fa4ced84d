use anyhow::{Context, Result};
use axum::{extract::FromRef, Router};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    auth::{AdminCredentials, UserRegistry},
    catalog::StaticCatalog,
    clock::SystemClock,
    config::Settings,
    state::{Latency, ParkingContext},
};

// Declare modules
mod auth;
mod auth_middleware;
mod catalog;
mod clock;
mod config;
mod error;
mod filter;
mod format;
mod hold;
mod models;
mod routes;
mod state;

// Define the application state struct
#[derive(Clone, FromRef)]
struct AppState {
    settings: Arc<Settings>,
    parking: ParkingContext,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file first. Ignore errors (e.g., file not found)
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "parkspot_rust=info,tower_http=info".into()))
        .with(fmt::layer())
        .init();

    tracing::info!("Initializing ParkSpot reservation server...");

    let settings = match Settings::new() {
        Ok(s) => {
            tracing::info!("Configuration loaded successfully.");
            s
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };
    let shared_settings = Arc::new(settings);

    let parking = ParkingContext::new(
        Arc::new(StaticCatalog::new(shared_settings.catalog_seed)),
        UserRegistry::with_demo_users(),
        AdminCredentials {
            email: shared_settings.admin_email.clone(),
            password: shared_settings.admin_password.clone(),
        },
        Arc::new(SystemClock),
        Latency::from_settings(&shared_settings),
    );

    // Populate the catalog before accepting requests
    parking
        .refresh_catalog()
        .await
        .context("Failed to load the initial parking catalog")?;

    let app_state = AppState {
        settings: shared_settings.clone(),
        parking,
    };

    let app: Router = routes::create_router(app_state.clone()).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = app_state
        .settings
        .server_address
        .parse()
        .with_context(|| format!("Invalid server address format: {}", app_state.settings.server_address))?;

    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => {
            tracing::info!("Server listening on {}", addr);
            l
        }
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
