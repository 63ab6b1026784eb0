use async_trait::async_trait;

/// Append-only audit log of chat interactions.
///
/// Writes are best-effort: the orchestrator records the outcome of an append
/// but never lets a failure change the caller-visible response.
#[async_trait]
pub trait InteractionLog: Send + Sync {
    async fn append(
        &self,
        session_id: &str,
        user_message: &str,
        assistant_message: &str,
    ) -> anyhow::Result<()>;
}
