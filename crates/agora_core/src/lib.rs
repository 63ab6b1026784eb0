//! Shared leaf crate for the Agora chat core: error taxonomy, chat request
//! types and validation, mount-path normalization, configuration, and the
//! interaction-log seam.

pub mod chat;
pub mod config;
pub mod error;
pub mod log;
pub mod mount;

pub use chat::{ChatQuery, ChatRequest, ChatTurn, UNKNOWN_SESSION};
pub use config::AgoraConfig;
pub use error::{AgoraError, Result};
pub use log::InteractionLog;
