//! Contains the data structures used for the non-streaming Ollama Chat API.

use ollama_probe_macros::FromBytes;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::Role;

/// Represents a chat request to the Ollama API.
///
/// The runner always asks for a single, non-streamed completion, so `stream`
/// is serialized explicitly rather than left to the server default.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// The name of the model to use for the chat completion (e.g., "llama3:8b").
    pub model: String,
    /// The conversation so far, oldest first.
    pub messages: Vec<ChatRequestMessage>,
    pub stream: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ChatRequestMessage {
    pub role: Role,
    pub content: String,
}

impl ChatRequestMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// A simplified chat request for non-streaming responses.
///
/// Converts into a [`ChatRequest`] with `stream` set to `false`.
#[derive(Default, Debug, Clone)]
pub struct SimpleChatRequest {
    pub model: String,
    pub messages: Vec<ChatRequestMessage>,
}

impl SimpleChatRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
        }
    }

    pub fn add_message(mut self, message: ChatRequestMessage) -> Self {
        self.messages.push(message);
        self
    }
}

impl From<SimpleChatRequest> for ChatRequest {
    fn from(value: SimpleChatRequest) -> Self {
        ChatRequest {
            model: value.model,
            messages: value.messages,
            stream: false,
        }
    }
}

/// Represents a chat response from the Ollama API.
///
/// Only `message.content` is read; every other field lands in `extra`
/// untyped, so fields the runner never prints cannot fail the decode.
///
/// A missing `message` key decodes to `None`. A `message` that is present
/// must be an object: `null` or any other value is a decode error.
#[derive(Deserialize, FromBytes, Debug, Clone, PartialEq)]
pub struct ChatResponse {
    #[serde(default, deserialize_with = "present_message")]
    pub message: Option<ChatResponseMessage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ChatResponseMessage {
    /// `None` only when the key is missing. An explicit `null` is kept as
    /// `Some(Value::Null)`.
    #[serde(default, deserialize_with = "present_value")]
    pub content: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn present_message<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<ChatResponseMessage>, D::Error>
where
    D: Deserializer<'de>,
{
    ChatResponseMessage::deserialize(deserializer).map(Some)
}

fn present_value<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl ChatResponse {
    /// The raw `message.content` value, or `None` when either key is missing.
    pub fn content(&self) -> Option<&Value> {
        self.message.as_ref()?.content.as_ref()
    }

    /// The reply as printable text: strings verbatim, any other JSON value
    /// in its compact JSON form.
    pub fn reply_text(&self) -> Option<String> {
        self.content().map(|content| match content {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }
}
