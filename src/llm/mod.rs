pub mod client;
pub mod oracle;

pub use client::LLMClient;
pub use oracle::Oracle;
