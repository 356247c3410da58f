//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{FsBlobAdapter, MemoryCatalogAdapter, OpenAiPlanAdapter, OpenAiQuestionAdapter},
    config::Config,
    error::ApiError,
    web::{api_router, state::AppState, ApiDoc},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Prepare the Upload Root ---
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    info!("Upload root ready at {}", config.upload_dir.display());

    // --- 3. Initialize Service Adapters ---
    let api_key = config
        .openai_api_key
        .as_ref()
        .ok_or_else(|| ApiError::Internal("OPENAI_API_KEY is required".to_string()))?;
    let openai_config = OpenAIConfig::new().with_api_key(api_key);
    let openai_client = Client::with_config(openai_config);

    let blob_store = Arc::new(FsBlobAdapter::new(config.upload_dir.clone()));
    let catalog = Arc::new(MemoryCatalogAdapter::new());
    let question_adapter = Arc::new(OpenAiQuestionAdapter::new(
        openai_client.clone(),
        config.question_model.clone(),
    ));
    let plan_adapter = Arc::new(OpenAiPlanAdapter::new(
        openai_client,
        config.plan_model.clone(),
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        blob_store,
        catalog,
        question_adapter,
        plan_adapter,
    });

    // --- 5. Configure CORS for the Frontend Dev Server ---
    let origin = config
        .frontend_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("invalid FRONTEND_ORIGIN: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 6. Create the Web Router ---
    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router(app_state))
        .layer(cors)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 7. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
