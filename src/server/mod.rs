//! The HTTP server that backs the dashboard.
//!
//! Three surfaces share one port: the JSON API under `/api`, the photo store proxy under
//! `/api/photos`, and the static dashboard files from the configured web root. Every
//! response carries permissive CORS headers because the dashboard may be hosted elsewhere
//! during development.

use crate::api::{self, Dataset, Mode, Photo, PhotoStore};
use crate::model::{DonationReport, ExpenseReport};
use crate::{Config, DataError, Result};
use anyhow::Context;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

struct AppState {
    config: Config,
    mode: Mode,
}

/// Binds to `port` and serves until the process is stopped.
pub async fn serve(config: Config, mode: Mode, port: u16) -> Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Unable to bind to port {port}"))?;
    info!("Listening on http://0.0.0.0:{port}");
    if matches!(mode, Mode::Test) {
        info!("Running in test mode, serving CSV fixtures from the test_data directory");
    }

    let state = Arc::new(AppState { config, mode });
    loop {
        let (stream, remote) = listener
            .accept()
            .await
            .context("Unable to accept a connection")?;
        debug!("connection from {remote}");
        let state = state.clone();
        tokio::task::spawn(async move {
            let service = service_fn(move |request| handle(state.clone(), request));
            if let Err(e) = hyper::server::conn::http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                debug!("connection error from {remote}: {e}");
            }
        });
    }
}

async fn handle(
    state: Arc<AppState>,
    request: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, Infallible> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    debug!("{method} {path}");

    let response = if method == Method::OPTIONS {
        // CORS preflight.
        empty_response(StatusCode::NO_CONTENT)
    } else {
        route(&state, request).await
    };
    Ok(with_cors(response))
}

async fn route(state: &AppState, request: Request<Incoming>) -> Response<Full<Bytes>> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    match (method, path.as_str()) {
        (Method::GET, "/api/donations") => dataset_response(state, Dataset::Donations).await,
        (Method::GET, "/api/expenses") => dataset_response(state, Dataset::Expenses).await,
        (Method::GET, "/api/photos") => photos_list(state).await,
        (Method::POST, "/api/photos") => photos_add(state, request).await,
        (Method::DELETE, "/api/photos") => photos_delete(state, request).await,
        (Method::GET, _) if !path.starts_with("/api/") => static_response(state, &path).await,
        _ => error_response(StatusCode::NOT_FOUND, "Not found"),
    }
}

/// Fetches, normalizes and aggregates one dataset. A transport failure is a 500; a sheet
/// with no usable rows is a 404 so the dashboard can tell the two apart.
async fn dataset_response(state: &AppState, dataset: Dataset) -> Response<Full<Bytes>> {
    let source = api::source(&state.config, dataset, state.mode);
    let csv = match source.fetch().await {
        Ok(csv) => csv,
        Err(e) => {
            error!("Unable to fetch the {dataset} CSV: {e:#}");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &format!("{e:#}"));
        }
    };
    let report = match dataset {
        Dataset::Donations => DonationReport::build(&csv, state.config.target_amount())
            .map(|report| serde_json::to_value(&report)),
        Dataset::Expenses => ExpenseReport::build(&csv).map(|report| serde_json::to_value(&report)),
    };
    match report {
        Ok(Ok(value)) => json_response(StatusCode::OK, &value),
        Ok(Err(e)) => {
            error!("Unable to serialize the {dataset} report: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Serialization failed")
        }
        Err(e @ (DataError::EmptyInput | DataError::NoValidRecords)) => {
            error_response(StatusCode::NOT_FOUND, &e.to_string())
        }
    }
}

fn photo_store(state: &AppState) -> Option<PhotoStore> {
    state
        .config
        .photo_store()
        .map(|(url, key)| PhotoStore::new(url, key))
}

async fn photos_list(state: &AppState) -> Response<Full<Bytes>> {
    let Some(store) = photo_store(state) else {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Photo store not configured");
    };
    match store.list().await {
        Ok(photos) => match serde_json::to_value(&photos) {
            Ok(value) => json_response(StatusCode::OK, &value),
            Err(e) => {
                error!("Unable to serialize the photo list: {e}");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Serialization failed")
            }
        },
        Err(e) => {
            error!("Photo store list failed: {e:#}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &format!("{e:#}"))
        }
    }
}

async fn photos_add(state: &AppState, request: Request<Incoming>) -> Response<Full<Bytes>> {
    let Some(store) = photo_store(state) else {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Photo store not configured");
    };
    let body = match request.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            error!("Unable to read the request body: {e}");
            return error_response(StatusCode::BAD_REQUEST, "Unable to read the request body");
        }
    };
    let photo: Photo = match serde_json::from_slice(&body) {
        Ok(photo) => photo,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, &format!("Invalid photo JSON: {e}"))
        }
    };
    match store.add(&photo).await {
        Ok(inserted) => match serde_json::to_value(&inserted) {
            Ok(value) => json_response(StatusCode::CREATED, &value),
            Err(e) => {
                error!("Unable to serialize the inserted photo: {e}");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Serialization failed")
            }
        },
        Err(e) => {
            error!("Photo store insert failed: {e:#}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &format!("{e:#}"))
        }
    }
}

async fn photos_delete(state: &AppState, request: Request<Incoming>) -> Response<Full<Bytes>> {
    let Some(store) = photo_store(state) else {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Photo store not configured");
    };
    let Some(id) = photo_id(request.uri().query()) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing or invalid id parameter");
    };
    match store.delete(id).await {
        Ok(()) => json_response(StatusCode::OK, &serde_json::json!({ "deleted": id })),
        Err(e) => {
            error!("Photo store delete failed: {e:#}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &format!("{e:#}"))
        }
    }
}

/// Pulls `id` from a query string like `id=42`.
fn photo_id(query: Option<&str>) -> Option<i64> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "id")
        .and_then(|(_, value)| value.parse().ok())
}

async fn static_response(state: &AppState, path: &str) -> Response<Full<Bytes>> {
    let Some(web_root) = state.config.web_root() else {
        return error_response(StatusCode::NOT_FOUND, "Not found");
    };
    let Some(relative) = static_file_path(path) else {
        return error_response(StatusCode::NOT_FOUND, "Not found");
    };
    let full_path = web_root.join(&relative);
    match tokio::fs::read(&full_path).await {
        Ok(bytes) => {
            let mut response = Response::new(Full::new(Bytes::from(bytes)));
            if let Ok(value) = content_type(&relative).parse() {
                response.headers_mut().insert("Content-Type", value);
            }
            response
        }
        Err(_) => error_response(StatusCode::NOT_FOUND, "Not found"),
    }
}

/// Maps a request path to a file path under the web root. Returns `None` for paths that
/// try to climb out of it.
fn static_file_path(path: &str) -> Option<PathBuf> {
    let relative = match path {
        "/" => "index.html",
        "/expenses" => "expenses.html",
        other => other.trim_start_matches('/'),
    };
    let relative = PathBuf::from(relative);
    let safe = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if safe && !relative.as_os_str().is_empty() {
        Some(relative)
    } else {
        None
    }
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

fn json_response(status: StatusCode, value: &serde_json::Value) -> Response<Full<Bytes>> {
    let body = value.to_string();
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    if let Ok(value) = "application/json".parse() {
        response.headers_mut().insert("Content-Type", value);
    }
    response
}

fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &serde_json::json!({ "error": message }))
}

fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

fn with_cors(mut response: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    let headers = response.headers_mut();
    let pairs = [
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Methods", "GET, POST, DELETE, OPTIONS"),
        ("Access-Control-Allow-Headers", "Content-Type"),
    ];
    for (name, value) in pairs {
        if let Ok(value) = value.parse() {
            headers.insert(name, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_file_path_root() {
        assert_eq!(static_file_path("/").unwrap(), PathBuf::from("index.html"));
        assert_eq!(
            static_file_path("/expenses").unwrap(),
            PathBuf::from("expenses.html")
        );
        assert_eq!(
            static_file_path("/css/style.css").unwrap(),
            PathBuf::from("css/style.css")
        );
    }

    #[test]
    fn test_static_file_path_rejects_traversal() {
        assert!(static_file_path("/../secrets.txt").is_none());
        assert!(static_file_path("/css/../../etc/passwd").is_none());
    }

    #[test]
    fn test_photo_id() {
        assert_eq!(photo_id(Some("id=42")), Some(42));
        assert_eq!(photo_id(Some("order=1&id=7")), Some(7));
        assert_eq!(photo_id(Some("id=abc")), None);
        assert_eq!(photo_id(Some("")), None);
        assert_eq!(photo_id(None), None);
    }

    #[test]
    fn test_content_type() {
        assert_eq!(
            content_type(Path::new("index.html")),
            "text/html; charset=utf-8"
        );
        assert_eq!(content_type(Path::new("logo.svg")), "image/svg+xml");
        assert_eq!(
            content_type(Path::new("data.bin")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_error_response_shape() {
        let response = error_response(StatusCode::NOT_FOUND, "No valid records found");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
