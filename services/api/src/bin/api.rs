//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, JwtAuthAdapter, MemoryStore},
    config::{Config, StorageBackend},
    error::ApiError,
    web::{router, state::AppState},
};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use reading_list_core::ports::{BookRepository, UserRepository};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Storage & Run Migrations ---
    let (users, books): (Arc<dyn UserRepository>, Arc<dyn BookRepository>) = match &config.storage
    {
        StorageBackend::Postgres {
            database_url,
            max_connections,
        } => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(database_url)
                .await?;
            let db_adapter = Arc::new(DbAdapter::new(db_pool));
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            (
                db_adapter.clone() as Arc<dyn UserRepository>,
                db_adapter as Arc<dyn BookRepository>,
            )
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on shutdown.");
            let store = Arc::new(MemoryStore::new());
            (
                store.clone() as Arc<dyn UserRepository>,
                store as Arc<dyn BookRepository>,
            )
        }
    };

    // --- 3. Initialize the Auth Adapter ---
    let auth_adapter = Arc::new(JwtAuthAdapter::new(
        &config.jwt_secret,
        config.token_ttl_seconds,
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(config.clone(), users, books, auth_adapter));

    let cors_origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let app = router(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "GraphiQL available at http://{}/graphql",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
