use agora_core::chat::ChatQuery;
use agora_core::error::{AgoraError, Result};
use async_trait::async_trait;
use rmcp::model::{CallToolRequestParams, CallToolResult, RawContent};
use rmcp::service::{RoleClient, RunningService, ServiceExt};
use rmcp::transport::TokioChildProcess;
use std::time::Duration;
use tokio::process::Command;

/// Upper bound on the MCP handshake during connect.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
/// Upper bound on a single query dispatch.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(120);

/// Tool the MCP server exposes for chat queries.
const QUERY_TOOL: &str = "process_query";

/// Handle to an established tool-server connection.
///
/// The manager owns exactly one of these behind its slot; nothing else ever
/// sees the raw handle.
#[async_trait]
pub trait ToolServerConnection: Send + Sync {
    /// Server path this connection was established against.
    fn server_path(&self) -> &str;

    /// Tool names advertised during the handshake.
    fn tool_names(&self) -> Vec<String>;

    /// Dispatch a validated query and return the assistant's text.
    async fn process_query(&self, query: &ChatQuery) -> Result<String>;

    /// Tear the connection down gracefully.
    async fn cleanup(&mut self) -> Result<()>;
}

/// Factory seam so the manager can be exercised without a child process.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn establish(&self, server_path: &str) -> Result<Box<dyn ToolServerConnection>>;
}

/// A live connection to an MCP server running as a child process.
pub struct McpConnection {
    server_path: String,
    tools: Vec<String>,
    // Taken during cleanup; a failed cancel leaves the record (path, tools)
    // readable so status keeps reporting the stale connection.
    service: Option<RunningService<RoleClient, ()>>,
}

impl McpConnection {
    /// Spawn the server, perform the MCP handshake, and discover its tools.
    pub async fn establish(server_path: &str) -> Result<Self> {
        let cmd = Command::new(server_path);
        let transport = TokioChildProcess::new(cmd).map_err(|e| {
            AgoraError::client(format!("failed to spawn MCP server '{server_path}': {e}"))
        })?;

        let service = tokio::time::timeout(CONNECT_TIMEOUT, ().serve(transport))
            .await
            .map_err(|_| {
                AgoraError::client(format!("MCP handshake timed out for '{server_path}'"))
            })?
            .map_err(|e| {
                AgoraError::client(format!("MCP handshake failed for '{server_path}': {e}"))
            })?;

        let tools = service.peer().list_all_tools().await.map_err(|e| {
            AgoraError::client(format!("list_tools failed for '{server_path}': {e}"))
        })?;

        tracing::info!(
            "MCP server '{}': {} tool(s) discovered",
            server_path,
            tools.len()
        );

        Ok(Self {
            server_path: server_path.to_string(),
            tools: tools.iter().map(|t| t.name.to_string()).collect(),
            service: Some(service),
        })
    }
}

#[async_trait]
impl ToolServerConnection for McpConnection {
    fn server_path(&self) -> &str {
        &self.server_path
    }

    fn tool_names(&self) -> Vec<String> {
        self.tools.clone()
    }

    async fn process_query(&self, query: &ChatQuery) -> Result<String> {
        let Some(service) = self.service.as_ref() else {
            return Err(AgoraError::client("MCP connection is closed"));
        };

        let arguments = serde_json::to_value(query)
            .ok()
            .and_then(|v| v.as_object().cloned());

        let params = CallToolRequestParams {
            meta: None,
            name: QUERY_TOOL.into(),
            arguments,
            task: None,
        };

        let result = tokio::time::timeout(QUERY_TIMEOUT, service.peer().call_tool(params))
            .await
            .map_err(|_| AgoraError::service("query processing timed out"))?
            .map_err(|e| classify_call_error(&e.to_string()))?;

        if result.is_error.unwrap_or(false) {
            return Err(AgoraError::service(text_content(&result)));
        }
        Ok(text_content(&result))
    }

    async fn cleanup(&mut self) -> Result<()> {
        let Some(service) = self.service.take() else {
            return Ok(());
        };
        match service.cancel().await {
            Ok(_) => {
                tracing::info!("MCP server '{}' disconnected", self.server_path);
                Ok(())
            }
            Err(e) => Err(AgoraError::client(format!(
                "failed to shut down MCP connection: {e:?}"
            ))),
        }
    }
}

/// Production connector backed by [`McpConnection`].
pub struct McpConnector;

#[async_trait]
impl Connector for McpConnector {
    async fn establish(&self, server_path: &str) -> Result<Box<dyn ToolServerConnection>> {
        Ok(Box::new(McpConnection::establish(server_path).await?))
    }
}

/// Transport-level failures are client errors; everything else came from the
/// service after the connection existed.
fn classify_call_error(msg: &str) -> AgoraError {
    if msg.contains("closed") || msg.contains("timeout") {
        AgoraError::client(format!("MCP transport failure: {msg}"))
    } else {
        AgoraError::service(format!("query processing failed: {msg}"))
    }
}

/// Concatenate the text content blocks of a tool result.
fn text_content(result: &CallToolResult) -> String {
    let text: String = result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    if text.is_empty() {
        "[no output]".to_string()
    } else {
        text
    }
}
