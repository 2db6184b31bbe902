pub mod config;
pub mod error;
pub mod frame;
pub mod ingestion;

pub use config::EngineConfig;
pub use error::{CoreError, Result};
