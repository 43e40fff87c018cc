//! Execution state threaded through a pipeline of operations

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Configuration;
use crate::error::{AdaptorError, Result};

/// Body of the last successful response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub body: Value,
}

/// State record passed from one operation to the next
///
/// Operations consume a state and return a new one; a state value is never
/// changed behind the caller's back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub configuration: Configuration,
    /// Results of earlier steps, oldest first
    #[serde(default)]
    pub references: Vec<Value>,
    /// Payload of the current step
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseEnvelope>,
}

impl State {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            ..Self::default()
        }
    }

    /// Build a state from a host-provided JSON document
    ///
    /// Missing `references` and `data` start out as `[]` and `null`.
    pub fn from_host(host_state: Value) -> Result<Self> {
        let mut seeded = serde_json::json!({
            "references": [],
            "data": null,
        });

        match host_state {
            Value::Object(fields) => {
                if let Some(target) = seeded.as_object_mut() {
                    target.extend(fields);
                }
            }
            Value::Null => {}
            other => {
                return Err(AdaptorError::Parameters(format!(
                    "host state must be an object, got {}",
                    other
                )));
            }
        }

        serde_json::from_value(seeded)
            .map_err(|e| AdaptorError::Parameters(format!("invalid host state: {}", e)))
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn with_references(mut self, references: Vec<Value>) -> Self {
        self.references = references;
        self
    }

    /// Next state carrying the given response body
    pub fn with_response(self, body: Value) -> Self {
        Self {
            response: Some(ResponseEnvelope { body }),
            ..self
        }
    }

    pub fn response_body(&self) -> Option<&Value> {
        self.response.as_ref().map(|r| &r.body)
    }
}
