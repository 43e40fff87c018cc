//! Run configuration
//!
//! Connection and credential data supplied once per run by the host. The base
//! address is either a raw `baseUrl` or an organization `resource` combined with
//! an `apiVersion` as `{resource}/api/data/v{apiVersion}`.

use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::api::constants::WEB_API_PATH;
use crate::error::{AdaptorError, Result};

/// How the access token is placed in the `Authorization` header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// Send the token verbatim; hosts pass a complete header value
    #[default]
    Raw,
    /// Prefix the token with `Bearer `
    Bearer,
}

impl AuthScheme {
    pub fn header_value(&self, token: &str) -> String {
        match self {
            Self::Raw => token.to_string(),
            Self::Bearer => format!("Bearer {}", token),
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "raw" => Some(Self::Raw),
            "bearer" => Some(Self::Bearer),
            _ => None,
        }
    }
}

/// Immutable connection data for a run
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Complete Web API root; takes precedence over `resource`/`api_version`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Organization URL, e.g. `https://org.crm.dynamics.com`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Web API version, e.g. `9.1` (hosts may send it as a JSON number)
    #[serde(
        default,
        deserialize_with = "deserialize_version",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_version: Option<String>,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub authorization: AuthScheme,
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("base_url", &self.base_url)
            .field("resource", &self.resource)
            .field("api_version", &self.api_version)
            .field("access_token", &"<redacted>")
            .field("authorization", &self.authorization)
            .finish()
    }
}

impl Configuration {
    /// Configuration addressing a raw Web API root
    pub fn with_base_url(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    /// Configuration addressing an organization resource at a Web API version
    pub fn with_resource(
        resource: impl Into<String>,
        api_version: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            resource: Some(resource.into()),
            api_version: Some(api_version.into()),
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    pub fn auth_scheme(mut self, scheme: AuthScheme) -> Self {
        self.authorization = scheme;
        self
    }

    /// Load configuration from `DYNAMICS_*` environment variables, reading `.env` first
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from a variable lookup
    ///
    /// Reads `DYNAMICS_BASE_URL`, `DYNAMICS_RESOURCE`, `DYNAMICS_API_VERSION`,
    /// `DYNAMICS_ACCESS_TOKEN` and `DYNAMICS_AUTH_SCHEME`.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let authorization = match non_empty("DYNAMICS_AUTH_SCHEME") {
            Some(value) => AuthScheme::parse(&value).ok_or_else(|| {
                AdaptorError::Configuration(format!(
                    "DYNAMICS_AUTH_SCHEME must be 'raw' or 'bearer', got '{}'",
                    value
                ))
            })?,
            None => AuthScheme::default(),
        };

        let config = Self {
            base_url: non_empty("DYNAMICS_BASE_URL"),
            resource: non_empty("DYNAMICS_RESOURCE"),
            api_version: non_empty("DYNAMICS_API_VERSION"),
            access_token: non_empty("DYNAMICS_ACCESS_TOKEN").ok_or_else(|| {
                AdaptorError::Configuration("DYNAMICS_ACCESS_TOKEN is not set".to_string())
            })?,
            authorization,
        };

        // Fail early rather than on the first operation
        config.base_address()?;
        Ok(config)
    }

    /// Web API root without a trailing slash
    pub fn base_address(&self) -> Result<String> {
        if let Some(base_url) = self.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(base_url.trim().trim_end_matches('/').to_string());
        }

        match (self.resource.as_deref(), self.api_version.as_deref()) {
            (Some(resource), Some(version)) => Ok(format!(
                "{}/{}/v{}",
                resource.trim().trim_end_matches('/'),
                WEB_API_PATH,
                version.trim().trim_start_matches('v')
            )),
            (Some(_), None) => Err(AdaptorError::Configuration(
                "resource is set but apiVersion is missing".to_string(),
            )),
            _ => Err(AdaptorError::Configuration(
                "either baseUrl or resource and apiVersion must be set".to_string(),
            )),
        }
    }

    /// URL of an entity collection
    pub fn entity_url(&self, entity_name: &str) -> Result<String> {
        Ok(format!(
            "{}/{}",
            self.base_address()?,
            entity_name.trim_start_matches('/')
        ))
    }

    /// Value of the `Authorization` header
    pub fn authorization_header(&self) -> Result<String> {
        if self.access_token.is_empty() {
            return Err(AdaptorError::Configuration(
                "accessToken is missing".to_string(),
            ));
        }
        Ok(self.authorization.header_value(&self.access_token))
    }
}

fn deserialize_version<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Version {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Version>::deserialize(deserializer)?.map(|v| match v {
        Version::Text(s) => s,
        Version::Number(n) => n.to_string(),
    }))
}
