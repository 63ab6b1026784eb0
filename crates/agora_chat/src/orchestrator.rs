use agora_core::chat::ChatRequest;
use agora_core::error::{AgoraError, Result};
use agora_core::log::InteractionLog;
use agora_mcp::ConnectionManager;
use std::sync::Arc;

/// Routes chat requests through the MCP connection.
///
/// Three strictly ordered steps: validate, dispatch, audit. The audit write
/// is best-effort and never reaches the caller.
pub struct ChatOrchestrator {
    manager: Arc<ConnectionManager>,
    log: Arc<dyn InteractionLog>,
}

impl ChatOrchestrator {
    pub fn new(manager: Arc<ConnectionManager>, log: Arc<dyn InteractionLog>) -> Self {
        Self { manager, log }
    }

    /// Process one chat request and return the assistant's response text.
    ///
    /// Validation failures never reach the connection; dispatch failures are
    /// propagated unchanged; a failed audit append is classified as a storage
    /// error and reported only through the diagnostic log.
    pub async fn process(&self, request: ChatRequest) -> Result<String> {
        let query = request.validate()?;
        let response = self.manager.dispatch(&query).await?;

        let session = query.session_id();
        if let Err(e) = self.log.append(session, &query.message, &response).await {
            let err = AgoraError::storage(format!(
                "failed to record interaction for '{session}': {e}"
            ));
            tracing::warn!("{err}");
        }

        Ok(response)
    }
}
