pub mod config;
pub mod id;
pub mod types;

pub use config::EdgeConfig;
pub use types::*;
