//! Query orchestration usecase: validate a chat request, dispatch it through
//! the MCP connection manager, and record the exchange best-effort.

pub mod orchestrator;

pub use orchestrator::ChatOrchestrator;
