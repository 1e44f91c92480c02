// Core modules
pub mod config;
pub mod error;
pub mod execution;
pub mod feed;
pub mod indicators;
pub mod models;
pub mod sim;
pub mod store;
pub mod strategy;

// Re-export commonly used types
pub use error::EngineError;
pub use models::*;
pub use strategy::Strategy;

// Error handling
pub type Result<T> = std::result::Result<T, EngineError>;
