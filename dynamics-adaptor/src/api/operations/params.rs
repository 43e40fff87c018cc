//! Operation parameters after reference expansion

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::api::query::QueryOptions;
use crate::error::{AdaptorError, Result};

/// Record key; hosts may pass GUIDs, alternate-key expressions, or numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Text(String),
    Number(serde_json::Number),
}

impl EntityId {
    /// Key as it appears between the parentheses of a record URL
    pub fn to_url_segment(&self) -> String {
        urlencoding::encode(&self.to_string()).into_owned()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

/// `{ entityName, entityId?, body?, query? }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityParams {
    pub entity_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryOptions>,
}

impl EntityParams {
    /// Deserialize expanded parameters, rejecting an empty entity name
    ///
    /// A blank `entityId` counts as absent.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut params: Self = serde_json::from_value(value)
            .map_err(|e| AdaptorError::Parameters(e.to_string()))?;

        if params.entity_name.trim().is_empty() {
            return Err(AdaptorError::Parameters(
                "entityName must not be empty".to_string(),
            ));
        }
        if matches!(&params.entity_id, Some(EntityId::Text(id)) if id.trim().is_empty()) {
            params.entity_id = None;
        }

        Ok(params)
    }

    /// Entity id, or a parameter error naming the operation that needs it
    pub fn require_id(&self, operation: &str) -> Result<&EntityId> {
        self.entity_id.as_ref().ok_or_else(|| {
            AdaptorError::Parameters(format!(
                "{} on '{}' requires an entityId",
                operation, self.entity_name
            ))
        })
    }
}
