pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod llm;
pub mod runner;
pub mod types;
pub mod ui;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::Config;
pub use error::ScriptError;
pub use generator::extractor::extract_code;
pub use generator::workflow::{LaunchRequest, LoopMode, LoopOutcome, launch};
