use std::sync::Arc;

use thiserror::Error;

use self::transport::Transport;

pub mod builder;
pub mod client;
pub mod config;
pub mod runner;
pub mod transport;
pub mod types;

pub use config::ProbeConfig;
pub use runner::{ProbeOutcome, ProbeRunner, RunReport};

#[derive(Clone)]
pub struct OllamaClient {
    transport: Arc<dyn Transport + Send + Sync>,
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Client error: {0}")]
    Client(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Failed to decode {target}: {source}")]
    Decode {
        target: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
