//! MCP connection layer: the child-process client, the connector seam, and
//! the manager that owns the single process-wide connection slot.

pub mod connection;
pub mod manager;

pub use connection::{Connector, McpConnection, McpConnector, ToolServerConnection};
pub use manager::{ConnectOutcome, ConnectionManager, ConnectionStatus};
