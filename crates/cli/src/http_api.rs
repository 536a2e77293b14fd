use crate::command::{self, CommandRequest, CommandResponse};
use crate::print_stdout;
use anyhow::{Context, Result};
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Response as HttpResponse, StatusCode},
    response::Response,
    routing::{get, post},
    Router,
};
use flora_dataset::DatasetHandle;
use flora_protocol::serialize_json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub loaded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    pub data: String,
}

/// `POST /command` and `GET /health` over one shared table.
pub fn router(dataset: Arc<DatasetHandle>) -> Router {
    Router::new()
        .route("/command", post(http_command))
        .route("/health", get(http_health))
        .with_state(dataset)
}

/// Load the table up front, then serve until the listener closes.
pub async fn serve_http(bind: &str, dataset: Arc<DatasetHandle>) -> Result<()> {
    let table = dataset.get().context("Failed to load dataset")?;
    log::info!(
        "Serving {} rows from {}",
        table.len(),
        dataset.options().path.display()
    );

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    let base_url = format!("http://{}", listener.local_addr()?);

    print_stdout(&format!("Serving Command API: {base_url}/command"))?;
    print_stdout(&format!("Health endpoint: {base_url}/health"))?;
    print_stdout(&format!(
        "Try: curl -X POST {base_url}/command -H 'Content-Type: application/json' -d '{{\"action\":\"species\"}}'"
    ))?;

    axum::serve(listener, router(dataset)).await?;
    Ok(())
}

async fn http_command(
    State(dataset): State<Arc<DatasetHandle>>,
    body: Bytes,
) -> Result<Response, StatusCode> {
    let request: CommandRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            let response = CommandResponse::invalid_request(format!("Invalid JSON request: {err}"));
            return build_response(StatusCode::BAD_REQUEST, &response);
        }
    };

    let response = tokio::task::spawn_blocking(move || command::execute(request, &dataset))
        .await
        .map_err(|err| {
            log::error!("Command task failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    build_response(StatusCode::OK, &response)
}

async fn http_health(State(dataset): State<Arc<DatasetHandle>>) -> Result<Response, StatusCode> {
    let rows = if dataset.is_loaded() {
        dataset.get().ok().map(|table| table.len())
    } else {
        None
    };
    let report = HealthReport {
        status: "ok".to_string(),
        loaded: rows.is_some(),
        rows,
        data: dataset.options().path.display().to_string(),
    };
    build_response(StatusCode::OK, &report)
}

fn build_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response, StatusCode> {
    let bytes = serialize_json(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .into_bytes();

    HttpResponse::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(bytes))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
