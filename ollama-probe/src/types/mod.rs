//! Contains data structures for requests and responses to the Ollama API.
//!
//! Only the two endpoints the probes touch are modelled: the model listing
//! (`/api/tags`) and non-streaming chat (`/api/chat`).

pub mod chat;
mod http;
mod models;
mod shared;

pub use http::*;
pub use models::*;
pub use shared::*;
