use agora_chat::ChatOrchestrator;
use agora_core::chat::ChatRequest;
use agora_core::error::AgoraError;
use agora_core::mount;
use agora_mcp::ConnectionManager;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared state for the gateway routes.
#[derive(Clone)]
struct AppState {
    orchestrator: Arc<ChatOrchestrator>,
    manager: Arc<ConnectionManager>,
}

/// Thin HTTP adapter over the chat core.
///
/// Routes, nested under the normalized API mount:
/// - `POST {mount}/connect` — (re)connect to the MCP server
/// - `POST {mount}/` — process a chat request
/// - `GET {mount}/status` — connection presence and advertised tools
/// - `GET /health` — liveness, outside the mount
pub struct GatewayServer {
    orchestrator: Arc<ChatOrchestrator>,
    manager: Arc<ConnectionManager>,
    host: String,
    port: u16,
    api_mount: String,
}

impl GatewayServer {
    pub fn new(
        orchestrator: Arc<ChatOrchestrator>,
        manager: Arc<ConnectionManager>,
        host: &str,
        port: u16,
        api_mount: &str,
    ) -> Self {
        Self {
            orchestrator,
            manager,
            host: host.to_string(),
            port,
            api_mount: mount::normalize(api_mount),
        }
    }

    /// Build the router. Separate from `start` so tests can drive it directly.
    pub fn router(&self) -> Router {
        let state = AppState {
            orchestrator: self.orchestrator.clone(),
            manager: self.manager.clone(),
        };

        let api = Router::new()
            .route("/connect", post(handle_connect))
            .route("/", post(handle_chat))
            .route("/status", get(handle_status))
            .with_state(state);

        let app = Router::new().route("/health", get(health));
        // Nesting at the root is rejected by axum; merge instead.
        let app = if self.api_mount == "/" {
            app.merge(api)
        } else {
            app.nest(&self.api_mount, api)
        };
        app.layer(CorsLayer::permissive())
    }

    /// Bind and serve on a background task, returning its join handle.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let app = self.router();

        tokio::spawn(async move {
            let listener = match tokio::net::TcpListener::bind(&addr).await {
                Ok(l) => l,
                Err(e) => {
                    tracing::error!("Gateway failed to bind {}: {}", addr, e);
                    return;
                }
            };
            tracing::info!("Gateway listening on {}", addr);
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Gateway server error: {}", e);
            }
        })
    }
}

// ============================================================================
// Route handlers
// ============================================================================

async fn health() -> &'static str {
    "ok"
}

/// POST {mount}/connect — tear down any existing MCP connection and
/// establish a new one.
async fn handle_connect(State(state): State<AppState>) -> Response {
    match state.manager.connect().await {
        Ok(outcome) => Json(json!({
            "success": true,
            "message": format!("Connected to MCP server at {}", outcome.server_path),
        }))
        .into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST {mount}/ — process a chat request.
async fn handle_chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    match state.orchestrator.process(request).await {
        Ok(text) => Json(json!({ "response": text })).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET {mount}/status — whether a connection is present, and its tools.
async fn handle_status(State(state): State<AppState>) -> Response {
    Json(state.manager.status().await).into_response()
}

/// Validation and environment failures are the caller's to fix; everything
/// else is a server-side failure.
fn http_status(error: &AgoraError) -> StatusCode {
    match error {
        AgoraError::Validation(_) | AgoraError::Environment(_) => StatusCode::BAD_REQUEST,
        AgoraError::Client(_) | AgoraError::Service(_) | AgoraError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(error: &AgoraError) -> Response {
    (http_status(error), Json(json!({ "error": error.to_string() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_core::chat::ChatQuery;
    use agora_core::error::Result;
    use agora_core::log::InteractionLog;
    use agora_mcp::{Connector, ToolServerConnection};
    use async_trait::async_trait;

    struct NullLog;

    #[async_trait]
    impl InteractionLog for NullLog {
        async fn append(&self, _: &str, _: &str, _: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct EchoConnection;

    #[async_trait]
    impl ToolServerConnection for EchoConnection {
        fn server_path(&self) -> &str {
            "/srv/mcp"
        }

        fn tool_names(&self) -> Vec<String> {
            vec!["process_query".to_string()]
        }

        async fn process_query(&self, query: &ChatQuery) -> Result<String> {
            Ok(format!("echo: {}", query.message))
        }

        async fn cleanup(&mut self) -> Result<()> {
            Ok(())
        }
    }

    struct EchoConnector;

    #[async_trait]
    impl Connector for EchoConnector {
        async fn establish(&self, _: &str) -> Result<Box<dyn ToolServerConnection>> {
            Ok(Box::new(EchoConnection))
        }
    }

    fn server(api_mount: &str) -> GatewayServer {
        let manager = Arc::new(ConnectionManager::new(
            Some("/srv/mcp".to_string()),
            Arc::new(EchoConnector),
        ));
        let orchestrator = Arc::new(ChatOrchestrator::new(manager.clone(), Arc::new(NullLog)));
        GatewayServer::new(orchestrator, manager, "127.0.0.1", 0, api_mount)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        assert_eq!(health().await, "ok");
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            http_status(&AgoraError::validation("bad")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            http_status(&AgoraError::environment("missing")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            http_status(&AgoraError::client("down")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            http_status(&AgoraError::service("failed")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            http_status(&AgoraError::storage("full")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_mount_is_normalized_at_construction() {
        assert_eq!(server("api/").api_mount, "/api");
        assert_eq!(server("").api_mount, "/api");
        assert_eq!(server("/").api_mount, "/");
    }

    #[test]
    fn test_router_builds_for_root_and_nested_mounts() {
        let _ = server("/api").router();
        let _ = server("/").router();
    }
}
