use crate::connection::{Connector, ToolServerConnection};
use agora_core::chat::ChatQuery;
use agora_core::error::{AgoraError, Result};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Success descriptor returned by a connect.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectOutcome {
    pub server_path: String,
}

/// Snapshot of the connection slot.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    pub initialized: bool,
    pub tools: Vec<String>,
}

/// Owns the single process-wide MCP connection slot.
///
/// `connect` holds the write lock for the whole teardown/establish sequence,
/// so concurrent connects serialize and a dispatch never observes a
/// connection mid-teardown. The raw handle never leaves this type.
pub struct ConnectionManager {
    server_path: Option<String>,
    connector: Arc<dyn Connector>,
    slot: RwLock<Option<Box<dyn ToolServerConnection>>>,
}

impl ConnectionManager {
    pub fn new(server_path: Option<String>, connector: Arc<dyn Connector>) -> Self {
        Self {
            server_path,
            connector,
            slot: RwLock::new(None),
        }
    }

    /// Establish a connection to the configured MCP server, tearing down any
    /// existing one first.
    ///
    /// A cleanup failure aborts the operation and leaves the old connection
    /// in the slot. An establish failure leaves the slot empty.
    pub async fn connect(&self) -> Result<ConnectOutcome> {
        let path = self
            .server_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AgoraError::environment("MCP_SERVER_PATH is not configured"))?
            .to_string();

        let mut slot = self.slot.write().await;

        if let Some(existing) = slot.as_mut() {
            // Early return keeps the stale connection in the slot.
            existing.cleanup().await?;
            *slot = None;
        }

        match self.connector.establish(&path).await {
            Ok(conn) => {
                tracing::info!("connected to MCP server at {}", path);
                *slot = Some(conn);
                Ok(ConnectOutcome { server_path: path })
            }
            Err(e) => {
                tracing::error!("failed to connect to MCP server at {}: {}", path, e);
                *slot = None;
                Err(e)
            }
        }
    }

    /// Whether a connection is present and which tools it advertises.
    pub async fn status(&self) -> ConnectionStatus {
        let slot = self.slot.read().await;
        match slot.as_ref() {
            Some(conn) => ConnectionStatus {
                initialized: true,
                tools: conn.tool_names(),
            },
            None => ConnectionStatus {
                initialized: false,
                tools: Vec::new(),
            },
        }
    }

    /// Dispatch a validated query through the current connection.
    ///
    /// The read lock is held across the presence check and the call, so a
    /// concurrent `connect` cannot swap the slot mid-dispatch.
    pub async fn dispatch(&self, query: &ChatQuery) -> Result<String> {
        let slot = self.slot.read().await;
        let conn = slot
            .as_ref()
            .ok_or_else(|| AgoraError::client("MCP client not initialized; call connect first"))?;
        conn.process_query(query).await
    }
}
