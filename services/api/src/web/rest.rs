//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints, the response
//! shapes the dashboard consumes, and the master definition for the
//! OpenAPI specification.

use crate::web::ingest_task::{ingest_process, IngestRequest};
use crate::web::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use studyai_core::domain::{DocumentPayload, Module, Paper, Question};
use studyai_core::ports::{GatewayError, ParseError, PipelineError};
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

/// Upper bound on the `question_count` form field.
const MAX_QUESTION_COUNT: u32 = 50;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        hello_handler,
        list_modules_handler,
        dashboard_data_handler,
        get_module_handler,
        new_module_handler,
        generate_plan_handler,
    ),
    components(
        schemas(
            HelloResponse,
            ModulesResponse,
            DashboardDataResponse,
            ModuleDto,
            ModuleSummaryDto,
            PaperDto,
            PaperSummaryDto,
            QuestionDto,
            NewModuleResponse,
            PlanResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "StudyAI API", description = "API endpoints for module ingestion and quiz generation.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// One multiple-choice question as the quiz player consumes it.
#[derive(Serialize, ToSchema)]
pub struct QuestionDto {
    /// 1-based position within the paper.
    id: u32,
    question: String,
    options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    correct_answer: usize,
    explanation: String,
}

/// A paper with its full question list.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaperDto {
    id: Uuid,
    name: String,
    questions: Vec<QuestionDto>,
    completed: u32,
    difficulty: String,
    /// Rendered as the dashboard shows it, e.g. "30 min".
    time_limit: String,
    created_at: DateTime<Utc>,
}

/// The abbreviated paper shape on the dashboard: `questions` is a count here,
/// not the question records.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaperSummaryDto {
    id: Uuid,
    name: String,
    questions: usize,
    completed: u32,
    difficulty: String,
    time_limit: String,
}

/// A module with its full papers and questions.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDto {
    id: String,
    name: String,
    description: String,
    progress: u8,
    color: String,
    papers: Vec<PaperDto>,
    created_at: DateTime<Utc>,
}

/// The module card on the dashboard, with per-module question totals.
#[derive(Serialize, ToSchema)]
pub struct ModuleSummaryDto {
    id: String,
    name: String,
    description: String,
    progress: u8,
    color: String,
    /// Total questions across every paper in the module.
    questions: usize,
    papers: Vec<PaperSummaryDto>,
}

/// The response payload for the module list endpoint.
#[derive(Serialize, ToSchema)]
pub struct ModulesResponse {
    modules: Vec<ModuleDto>,
    count: usize,
}

/// Everything the dashboard needs in one call.
#[derive(Serialize, ToSchema)]
pub struct DashboardDataResponse {
    modules: Vec<ModuleSummaryDto>,
    papers: Vec<PaperSummaryDto>,
}

/// The response payload sent after a successful ingestion.
#[derive(Serialize, ToSchema)]
pub struct NewModuleResponse {
    message: String,
    questions: Vec<QuestionDto>,
}

/// The response payload for the study-plan endpoint.
#[derive(Serialize, ToSchema)]
pub struct PlanResponse {
    plan: String,
}

/// The liveness probe payload.
#[derive(Serialize, ToSchema)]
pub struct HelloResponse {
    message: String,
}

/// The error body shared by every failing endpoint: a stable `error` field
/// plus optional diagnostics (e.g. the raw model reply on a parse failure).
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl From<&Question> for QuestionDto {
    fn from(question: &Question) -> Self {
        Self {
            id: question.ordinal,
            question: question.text.clone(),
            options: question.options.clone(),
            correct_answer: question.correct_option_index,
            explanation: question.explanation.clone(),
        }
    }
}

impl From<&Paper> for PaperDto {
    fn from(paper: &Paper) -> Self {
        Self {
            id: paper.id,
            name: paper.name.clone(),
            questions: paper.questions.iter().map(QuestionDto::from).collect(),
            completed: paper.completed,
            difficulty: paper.difficulty.as_str().to_string(),
            time_limit: format!("{} min", paper.time_limit_minutes),
            created_at: paper.created_at,
        }
    }
}

impl From<&Paper> for PaperSummaryDto {
    fn from(paper: &Paper) -> Self {
        Self {
            id: paper.id,
            name: paper.name.clone(),
            questions: paper.questions.len(),
            completed: paper.completed,
            difficulty: paper.difficulty.as_str().to_string(),
            time_limit: format!("{} min", paper.time_limit_minutes),
        }
    }
}

impl From<&Module> for ModuleDto {
    fn from(module: &Module) -> Self {
        Self {
            id: module.id.clone(),
            name: module.name.clone(),
            description: module.description.clone(),
            progress: module.progress,
            color: module.color_tag.clone(),
            papers: module.papers.iter().map(PaperDto::from).collect(),
            created_at: module.created_at,
        }
    }
}

impl From<&Module> for ModuleSummaryDto {
    fn from(module: &Module) -> Self {
        Self {
            id: module.id.clone(),
            name: module.name.clone(),
            description: module.description.clone(),
            progress: module.progress,
            color: module.color_tag.clone(),
            questions: module.papers.iter().map(|p| p.questions.len()).sum(),
            papers: module.papers.iter().map(PaperSummaryDto::from).collect(),
        }
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

fn bad_request(message: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message,
            details: None,
        }),
    )
}

/// Maps a pipeline failure onto a status code and the `{error, details}` body.
/// A parse failure carries the raw model reply as `details` so the caller can
/// see exactly what the model said.
fn pipeline_error_response(err: PipelineError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, details) = match &err {
        PipelineError::NoDocuments => (StatusCode::BAD_REQUEST, None),
        PipelineError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        PipelineError::Gateway(GatewayError::Timeout(_)) => (StatusCode::GATEWAY_TIMEOUT, None),
        PipelineError::Gateway(_) => (StatusCode::BAD_GATEWAY, None),
        PipelineError::Parse(ParseError::Malformed { raw_reply, .. }) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Some(raw_reply.clone()))
        }
        PipelineError::NotFound(_) => (StatusCode::NOT_FOUND, None),
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            details,
        }),
    )
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/api/hello",
    responses(
        (status = 200, description = "The service is up", body = HelloResponse)
    )
)]
pub async fn hello_handler() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello from StudyAI".to_string(),
    })
}

/// List every module with its full papers and questions, in creation order.
#[utoipa::path(
    get,
    path = "/api/modules",
    responses(
        (status = 200, description = "All modules in creation order", body = ModulesResponse)
    )
)]
pub async fn list_modules_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<ModulesResponse> {
    let modules: Vec<ModuleDto> = app_state
        .catalog
        .list_modules()
        .await
        .iter()
        .map(ModuleDto::from)
        .collect();
    let count = modules.len();
    Json(ModulesResponse { modules, count })
}

/// Summaries for the dashboard: module cards plus a flat list of all papers.
#[utoipa::path(
    get,
    path = "/api/dashboardData",
    responses(
        (status = 200, description = "Module and paper summaries", body = DashboardDataResponse)
    )
)]
pub async fn dashboard_data_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<DashboardDataResponse> {
    let modules = app_state.catalog.list_modules().await;
    let summaries: Vec<ModuleSummaryDto> = modules.iter().map(ModuleSummaryDto::from).collect();
    let papers: Vec<PaperSummaryDto> = modules
        .iter()
        .flat_map(|m| m.papers.iter().map(PaperSummaryDto::from))
        .collect();
    Json(DashboardDataResponse {
        modules: summaries,
        papers,
    })
}

/// Fetch one module by id.
#[utoipa::path(
    get,
    path = "/api/module/{module_id}",
    params(
        ("module_id" = String, Path, description = "The caller-supplied module identifier.")
    ),
    responses(
        (status = 200, description = "The module with its papers and questions", body = ModuleDto),
        (status = 404, description = "No module with this id", body = ErrorResponse)
    )
)]
pub async fn get_module_handler(
    State(app_state): State<Arc<AppState>>,
    Path(module_id): Path<String>,
) -> Result<Json<ModuleDto>, (StatusCode, Json<ErrorResponse>)> {
    match app_state.catalog.get_module(&module_id).await {
        Some(module) => Ok(Json(ModuleDto::from(&module))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("module '{}' not found", module_id),
                details: None,
            }),
        )),
    }
}

/// Create or extend a module by uploading documents and generating a paper.
///
/// Accepts a multipart/form-data request with a `module` id field, an optional
/// `module_name`, an optional `question_count`, and one-or-more `files` parts.
/// Runs the full ingestion pipeline and returns the generated questions.
#[utoipa::path(
    post,
    path = "/api/newModule",
    request_body(content_type = "multipart/form-data", description = "Module id and study documents."),
    responses(
        (status = 200, description = "A new paper was generated", body = NewModuleResponse),
        (status = 400, description = "Missing or invalid form fields", body = ErrorResponse),
        (status = 500, description = "Storage failed or the model reply did not match the schema", body = ErrorResponse),
        (status = 502, description = "The model gateway failed", body = ErrorResponse),
        (status = 504, description = "The model gateway timed out", body = ErrorResponse)
    )
)]
pub async fn new_module_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<NewModuleResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut module_id: Option<String> = None;
    let mut module_name: Option<String> = None;
    let mut question_count: Option<u32> = None;
    let mut documents: Vec<DocumentPayload> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("failed to read multipart form: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "module" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("failed to read 'module' field: {}", e)))?;
                module_id = Some(value.trim().to_string());
            }
            "module_name" => {
                let value = field.text().await.map_err(|e| {
                    bad_request(format!("failed to read 'module_name' field: {}", e))
                })?;
                let value = value.trim().to_string();
                if !value.is_empty() {
                    module_name = Some(value);
                }
            }
            "question_count" => {
                let value = field.text().await.map_err(|e| {
                    bad_request(format!("failed to read 'question_count' field: {}", e))
                })?;
                let parsed = value.trim().parse::<u32>().map_err(|_| {
                    bad_request(format!("'{}' is not a valid question count", value.trim()))
                })?;
                if parsed == 0 || parsed > MAX_QUESTION_COUNT {
                    return Err(bad_request(format!(
                        "question_count must be between 1 and {}",
                        MAX_QUESTION_COUNT
                    )));
                }
                question_count = Some(parsed);
            }
            "files" => {
                let filename = field.file_name().unwrap_or("untitled.txt").to_string();
                // Prefer the part's declared content type; fall back to the extension.
                let mime_type = field.content_type().map(str::to_string).unwrap_or_else(|| {
                    mime_guess::from_path(&filename)
                        .first_or_octet_stream()
                        .to_string()
                });
                let data = field.bytes().await.map_err(|e| {
                    bad_request(format!("failed to read uploaded file '{}': {}", filename, e))
                })?;
                documents.push(DocumentPayload {
                    filename,
                    mime_type,
                    bytes: data,
                });
            }
            _ => {
                // Unknown fields are ignored rather than rejected.
            }
        }
    }

    let module_id = module_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| bad_request("the 'module' field is required".to_string()))?;

    let request = IngestRequest {
        module_id,
        module_name,
        documents,
        question_count: question_count.unwrap_or(app_state.config.default_question_count),
    };

    match ingest_process(app_state.clone(), request).await {
        Ok(paper) => {
            let questions: Vec<QuestionDto> =
                paper.questions.iter().map(QuestionDto::from).collect();
            Ok(Json(NewModuleResponse {
                message: format!(
                    "Generated {} with {} question(s).",
                    paper.name,
                    questions.len()
                ),
                questions,
            }))
        }
        Err(e) => {
            error!("Ingestion failed: {}", e);
            Err(pipeline_error_response(e))
        }
    }
}

/// The query parameters for the study-plan endpoint.
#[derive(Deserialize)]
pub struct PlanQuery {
    goal: String,
}

/// Generate a free-text study plan for a goal.
#[utoipa::path(
    get,
    path = "/api/plan",
    params(
        ("goal" = String, Query, description = "The goal to plan for.")
    ),
    responses(
        (status = 200, description = "A generated plan", body = PlanResponse),
        (status = 502, description = "The model gateway failed", body = ErrorResponse)
    )
)]
pub async fn generate_plan_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<PlanQuery>,
) -> Result<Json<PlanResponse>, (StatusCode, Json<ErrorResponse>)> {
    match app_state.plan_adapter.generate_plan(&query.goal).await {
        Ok(plan) => Ok(Json(PlanResponse { plan })),
        Err(e) => {
            error!("Plan generation failed: {}", e);
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                    details: None,
                }),
            ))
        }
    }
}

//=========================================================================================
// Router Assembly
//=========================================================================================

/// Builds the service router. Lives in the library (not the binary) so
/// integration tests can drive the real routes.
pub fn api_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/hello", get(hello_handler))
        .route("/api/modules", get(list_modules_handler))
        .route("/api/dashboardData", get(dashboard_data_handler))
        .route("/api/module/{module_id}", get(get_module_handler))
        .route("/api/newModule", post(new_module_handler))
        .route("/api/plan", get(generate_plan_handler))
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .with_state(app_state)
}
