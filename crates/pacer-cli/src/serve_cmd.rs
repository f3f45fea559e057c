use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use pacer_core::config::EngineConfig;
use pacer_core::planner::get_plan_with_workouts;
use pacer_core::reconcile::ReconcileError;
use pacer_core::tools::{ToolError, ToolOutput, ToolRegistry, ToolSpec};
use pacer_db::models::TrainingPlan;
use pacer_db::queries::plans as plan_db;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{err:#}"),
        }
    }
}

impl From<ReconcileError> for AppError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::PlanNotFound(_) => Self::not_found(err.to_string()),
            ReconcileError::InvalidInput(_) => Self::bad_request(err.to_string()),
            ReconcileError::Store(e) => Self::internal(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// State and response types
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pool: PgPool,
    tools: Arc<ToolRegistry>,
}

#[derive(Debug, Deserialize)]
pub struct PlanFilter {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PlanSummaryResponse {
    #[serde(flatten)]
    pub plan: TrainingPlan,
    pub workout_count: i64,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(pool: PgPool, engine: EngineConfig) -> Router {
    let state = AppState {
        tools: Arc::new(ToolRegistry::new(pool.clone(), engine)),
        pool,
    };
    Router::new()
        .route("/", get(index))
        .route("/api/plans", get(list_plans))
        .route("/api/plans/{id}", get(get_plan_detail))
        .route("/api/tools", get(list_tools))
        .route("/api/tools/{name}", post(call_tool))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(pool: PgPool, engine: EngineConfig, bind: &str, port: u16) -> Result<()> {
    let app = build_router(pool, engine);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("pacer serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("pacer serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl+C: {e}");
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

async fn index(State(state): State<AppState>) -> Result<axum::response::Response, AppError> {
    let plans = plan_db::list_plans(&state.pool, None)
        .await
        .map_err(AppError::internal)?;

    let rows = if plans.is_empty() {
        "<tr><td colspan=\"3\">No plans found.</td></tr>".to_string()
    } else {
        plans
            .iter()
            .map(|p| {
                format!(
                    "<tr><td><a href=\"/api/plans/{id}\">{id}</a></td><td>{user}</td><td>{goal}</td></tr>",
                    id = p.id,
                    user = escape_html(&p.user_id),
                    goal = escape_html(&p.goal),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let html = format!(
        "<!DOCTYPE html>\
<html><head><title>pacer</title></head><body>\
<h1>pacer</h1>\
<p><a href=\"/api/plans\">/api/plans</a> | <a href=\"/api/tools\">/api/tools</a></p>\
<table><tr><th>Plan</th><th>User</th><th>Goal</th></tr>{rows}</table>\
</body></html>"
    );

    Ok(Html(html).into_response())
}

async fn list_plans(
    State(state): State<AppState>,
    Query(filter): Query<PlanFilter>,
) -> Result<axum::response::Response, AppError> {
    let plans = plan_db::list_plans(&state.pool, filter.user_id.as_deref())
        .await
        .map_err(AppError::internal)?;

    let mut results = Vec::with_capacity(plans.len());
    for plan in plans {
        let (workout_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM workouts WHERE plan_id = $1")
                .bind(plan.id)
                .fetch_one(&state.pool)
                .await
                .map_err(|e| AppError::internal(e.into()))?;
        results.push(PlanSummaryResponse {
            plan,
            workout_count,
        });
    }

    Ok(Json(results).into_response())
}

async fn get_plan_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, AppError> {
    let detail = get_plan_with_workouts(&state.pool, id).await?;
    Ok(Json(detail).into_response())
}

async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolSpec>> {
    Json(state.tools.specs())
}

async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(args): Json<Value>,
) -> Result<Json<ToolOutput>, AppError> {
    if !(args.is_object() || args.is_null()) {
        return Err(AppError::bad_request("tool arguments must be a JSON object"));
    }

    match state.tools.invoke(&name, &args).await {
        Ok(out) => Ok(Json(out)),
        Err(ToolError::UnknownTool(n)) => Err(AppError::not_found(format!("unknown tool '{n}'"))),
        Err(e) => Err(AppError::internal(e.into())),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
