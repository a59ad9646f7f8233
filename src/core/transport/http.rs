//! HTTP transport implementation.
//!
//! Every handler is reachable at `POST /{handler}` with its request object as
//! the JSON body. Operational endpoints live under `/_gateway/`, which no
//! single-segment handler route can shadow.

use std::future::Future;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::GatewayServer;
use crate::domains::dispatch::{DispatchError, FieldIssue};

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// Error body returned for every non-200 response.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [FieldIssue]>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Run the HTTP transport until `shutdown` resolves.
    ///
    /// In-flight requests are allowed to finish after the signal.
    pub async fn run<F>(self, server: GatewayServer, shutdown: F) -> TransportResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.address();
        let app = router(server, self.config.enable_cors);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("Ready - listening on {} (CORS {})", addr, cors_status);
        info!("  → Dispatch: POST /{{handler}}");
        info!("  → Health:   GET /_gateway/health");
        info!("  → Catalog:  GET /_gateway/catalog");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Build the gateway router.
pub fn router(server: GatewayServer, enable_cors: bool) -> Router {
    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/_gateway/health", get(health_check))
        .route("/_gateway/catalog", get(catalog_handler))
        .route("/{handler}", post(dispatch_handler))
        .with_state(server)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Root handler - provides service info.
async fn root_handler(State(server): State<GatewayServer>) -> impl IntoResponse {
    let snapshot = server.snapshot();

    Json(serde_json::json!({
        "name": server.name(),
        "version": server.version(),
        "transport": "HTTP",
        "endpoints": {
            "dispatch": "POST /{handler}",
            "health": "/_gateway/health",
            "catalog": "/_gateway/catalog"
        },
        "handlers": snapshot.names()
    }))
}

/// Health check endpoint.
async fn health_check(State(server): State<GatewayServer>) -> impl IntoResponse {
    let snapshot = server.snapshot();

    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "generation": snapshot.generation(),
        "handlers": snapshot.len()
    }))
}

/// The catalog of the live snapshot.
async fn catalog_handler(State(server): State<GatewayServer>) -> Response {
    match server.catalog() {
        Ok(catalog) => Json(catalog).into_response(),
        Err(e) => {
            error!("Cannot build catalog: {}", e);
            let body = ErrorBody {
                error: "Catalog unavailable",
                fields: None,
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

/// Dispatch a request to a handler.
#[instrument(skip_all, fields(handler = %handler))]
async fn dispatch_handler(
    State(server): State<GatewayServer>,
    Path(handler): Path<String>,
    body: Bytes,
) -> Response {
    match server.dispatch(&handler, &body).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// HTTP status of a dispatch failure.
pub fn status_of(error: &DispatchError) -> StatusCode {
    match error {
        DispatchError::NotFound(_) => StatusCode::NOT_FOUND,
        DispatchError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
        DispatchError::HandlerFailed { .. } | DispatchError::TimedOut { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(error: &DispatchError) -> Response {
    let body = ErrorBody {
        error: error.public_message(),
        fields: error.fields(),
    };
    (status_of(error), Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::core::config::HandlerSource;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::{Value, json};
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app(dir: &TempDir) -> Router {
        fs::write(
            dir.path().join("hello.toml"),
            "description = \"Greet person by name\"\n[invoke]\nbuiltin = \"greet\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("kelvin.toml"),
            "[invoke]\nbuiltin = \"kelvin_to_celsius\"\n",
        )
        .unwrap();

        fs::write(
            dir.path().join("mm.toml"),
            "[invoke]\nbuiltin = \"multiply_matrices\"\n",
        )
        .unwrap();

        let mut config = Config::default();
        config.handlers.sources = vec![HandlerSource::new(dir.path())];
        let server = GatewayServer::new(config);
        server.reload().unwrap();

        router(server, true)
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_greet_ok() {
        let dir = TempDir::new().unwrap();
        let (status, body) = post_json(app(&dir), "/hello", r#"{"name": "Ann"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"greeting": "Hello Ann"}));
    }

    #[tokio::test]
    async fn test_greet_missing_name() {
        let dir = TempDir::new().unwrap();
        let (status, body) = post_json(app(&dir), "/hello", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "error": "Validation failed",
                "fields": [{"field": "name", "problem": "missing required field"}]
            })
        );
    }

    #[tokio::test]
    async fn test_nested_decode_error_is_bad_request() {
        let dir = TempDir::new().unwrap();
        let (status, body) = post_json(
            app(&dir),
            "/mm",
            r#"{"matrix1": [["x"]], "matrix2": [[1]]}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["fields"][0]["field"], "matrix1[0][0]");

        let (status, body) =
            post_json(app(&dir), "/mm", r#"{"matrix1": [[2]], "matrix2": [[3]]}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"result": [[6.0]]}));
    }

    #[tokio::test]
    async fn test_unknown_handler() {
        let dir = TempDir::new().unwrap();
        let (status, body) = post_json(app(&dir), "/nope", r#"{"name": "Ann"}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Handler not found"}));
    }

    #[tokio::test]
    async fn test_handler_failure_is_opaque() {
        let dir = TempDir::new().unwrap();
        let (status, body) = post_json(app(&dir), "/kelvin", r#"{"kelvin": -1}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Handler failed"}));
    }

    #[tokio::test]
    async fn test_health_and_catalog() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir);

        let (status, health) = get_json(app.clone(), "/_gateway/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["generation"], 1);
        assert_eq!(health["handlers"], 3);

        let (status, catalog) = get_json(app.clone(), "/_gateway/catalog").await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = catalog
            .as_array()
            .unwrap()
            .iter()
            .map(|function| function["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["hello", "kelvin", "mm"]);

        let (status, root) = get_json(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(root["handlers"], json!(["hello", "kelvin", "mm"]));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(&DispatchError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(&DispatchError::validation_failed("x", Vec::new())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(&DispatchError::TimedOut {
                handler: "x".to_string(),
                timeout: std::time::Duration::from_secs(1),
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
