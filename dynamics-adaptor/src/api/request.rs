//! Fully built OData request, independent of the HTTP client

use reqwest::Method;
use serde_json::Value;

use super::constants::{ODATA_VERSION, headers};

/// A single request ready to be handed to a transport
#[derive(Debug, Clone, PartialEq)]
pub struct ODataRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ODataRequest {
    /// Request carrying the fixed OData headers and the given authorization value
    pub fn new(method: Method, url: impl Into<String>, authorization: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: vec![
                (headers::ODATA_MAX_VERSION.to_string(), ODATA_VERSION.to_string()),
                (headers::ODATA_VERSION.to_string(), ODATA_VERSION.to_string()),
                (headers::CONTENT_TYPE.to_string(), headers::APPLICATION_JSON.to_string()),
                (headers::AUTHORIZATION.to_string(), authorization.into()),
            ],
            body: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
