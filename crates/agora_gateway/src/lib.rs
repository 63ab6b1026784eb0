//! HTTP adapter over the chat core.

pub mod server;

pub use server::GatewayServer;
