//! # API REST
//!
//! REST API for the symptom triage service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON bodies, status codes, CORS)
//!
//! The pipelines themselves live in `triage-core`; this crate only parses requests and maps
//! results and failures onto responses.

#![warn(rust_2018_idioms)]

pub mod error;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{ErrorRes, ExtractReq, ExtractRes, HealthRes, HealthService, SeverityRes};
use triage_core::{QuestionnaireAnswer, RawText, SeverityClassifier, SymptomExtractor};

pub use error::ApiError;

/// Application state shared across handlers.
///
/// Both pipelines are built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<SymptomExtractor>,
    pub classifier: SeverityClassifier,
}

impl AppState {
    pub fn new(extractor: SymptomExtractor, classifier: SeverityClassifier) -> Self {
        Self {
            extractor: Arc::new(extractor),
            classifier,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(root, health, extract, predict_severity),
    components(schemas(ExtractReq, ExtractRes, SeverityRes, ErrorRes, HealthRes))
)]
pub struct ApiDoc;

/// Build the service router with docs and CORS attached.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/extract", post(extract))
        .route("/predict_severity", post(predict_severity))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the router on an already bound listener until the server stops.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = String, content_type = "text/plain")
    )
)]
async fn root() -> &'static str {
    "Symptom triage service is running"
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/extract",
    request_body = ExtractReq,
    responses(
        (status = 200, description = "Extracted symptom terms", body = ExtractRes),
        (status = 400, description = "Missing or blank text", body = ErrorRes),
        (status = 500, description = "Annotation failed", body = ErrorRes)
    )
)]
/// Extract symptom terms from free text
///
/// The text is translated to the canonical language when possible (the original text is used
/// if translation fails), annotated, and reduced to entity-tagged terms. When no entity is
/// found the non-stopword tokens are returned instead.
///
/// # Returns
/// * `Ok(Json<ExtractRes>)` - Symptom terms in text order
/// * `Err(ApiError)` - 400 for a missing, empty or unreadable body; 500 if annotation fails
#[axum::debug_handler]
async fn extract(
    State(state): State<AppState>,
    payload: Result<Json<ExtractReq>, JsonRejection>,
) -> Result<Json<ExtractRes>, ApiError> {
    let text = payload
        .ok()
        .and_then(|Json(req)| req.text)
        .ok_or(ApiError::NoText)?;
    let text = RawText::new(text).map_err(|_| ApiError::NoText)?;

    let symptoms = state.extractor.extract(&text).await?;
    Ok(Json(ExtractRes { symptoms }))
}

#[utoipa::path(
    post,
    path = "/predict_severity",
    request_body(
        content = Object,
        description = "Questionnaire answers keyed by field name, e.g. `age`, `weightChange`, `symptomWorsening`. Missing fields take their defaults."
    ),
    responses(
        (status = 200, description = "Severity label", body = SeverityRes),
        (status = 400, description = "Body is not a JSON object", body = ErrorRes),
        (status = 500, description = "Classification failed", body = ErrorRes)
    )
)]
/// Classify questionnaire answers into a severity label
///
/// # Returns
/// * `Ok(Json<SeverityRes>)` - `Normal`, `Medium` or `High`
/// * `Err(ApiError)` - 400 for an unreadable body; 500 if the classifier fails or
///   returns a class with no label
#[axum::debug_handler]
async fn predict_severity(
    State(state): State<AppState>,
    payload: Result<Json<QuestionnaireAnswer>, JsonRejection>,
) -> Result<Json<SeverityRes>, ApiError> {
    let Json(answers) = payload?;
    let label = state.classifier.classify(&answers)?;
    Ok(Json(SeverityRes {
        severity: label.to_string(),
    }))
}
