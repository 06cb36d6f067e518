use std::fmt;

use ollama_probe_macros::FromBytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The body returned by `/api/tags`, kept as unstructured JSON.
///
/// The listing probe prints the body as the server sent it, so no schema is
/// imposed beyond "valid JSON".
#[derive(Deserialize, Serialize, FromBytes, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct ListModelsResponse(pub Value);

impl ListModelsResponse {
    /// Names of the advertised models.
    ///
    /// Entries of the `models` array may be plain strings or objects carrying
    /// a `name` field (the shape Ollama itself returns). Anything else is
    /// skipped.
    pub fn model_names(&self) -> Vec<&str> {
        let Some(models) = self.0.get("models").and_then(Value::as_array) else {
            return Vec::new();
        };

        models
            .iter()
            .filter_map(|model| match model {
                Value::String(name) => Some(name.as_str()),
                Value::Object(fields) => fields.get("name").and_then(Value::as_str),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for ListModelsResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
