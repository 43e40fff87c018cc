//! CRUD operation builders for Dynamics 365 entities

use log::{debug, info, trace, warn};
use reqwest::Method;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::params::EntityParams;
use crate::api::constants::headers;
use crate::api::request::ODataRequest;
use crate::api::response::classify;
use crate::api::transport::HttpTransport;
use crate::error::{AdaptorError, Result};
use crate::references::ReferenceResolver;
use crate::state::State;

/// Host function applied to a state, used for post-processing and `alter_state`
pub type StateFn = Arc<dyn Fn(State) -> anyhow::Result<State> + Send + Sync>;

/// The four supported operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Query,
    Update,
    Delete,
}

impl OperationKind {
    /// Get the HTTP method for this operation
    pub fn http_method(&self) -> Method {
        match self {
            Self::Create => Method::POST,
            Self::Query => Method::GET,
            Self::Update => Method::PATCH,
            Self::Delete => Method::DELETE,
        }
    }

    /// Get the operation type as a string
    pub fn operation_type(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Query => "query",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// A declarative entity operation, applied to a state to perform one request
#[derive(Clone)]
pub struct EntityOperation {
    kind: OperationKind,
    params: Value,
    post_process: Option<StateFn>,
}

impl fmt::Debug for EntityOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityOperation")
            .field("kind", &self.kind)
            .field("params", &self.params)
            .field("post_process", &self.post_process.is_some())
            .finish()
    }
}

/// POST `{base}/{entityName}` with `body`
pub fn create_entity(params: Value) -> EntityOperation {
    EntityOperation::new(OperationKind::Create, params)
}

/// GET `{base}/{entityName}` or `{base}/{entityName}({entityId})` with optional `query`
pub fn query(params: Value) -> EntityOperation {
    EntityOperation::new(OperationKind::Query, params)
}

/// PATCH `{base}/{entityName}({entityId})` with `body`
pub fn update_entity(params: Value) -> EntityOperation {
    EntityOperation::new(OperationKind::Update, params)
}

/// DELETE `{base}/{entityName}({entityId})`
pub fn delete_entity(params: Value) -> EntityOperation {
    EntityOperation::new(OperationKind::Delete, params)
}

impl EntityOperation {
    pub fn new(kind: OperationKind, params: Value) -> Self {
        Self {
            kind,
            params,
            post_process: None,
        }
    }

    /// Attach a function applied to the next state after a successful response
    pub fn then<F>(mut self, post_process: F) -> Self
    where
        F: Fn(State) -> anyhow::Result<State> + Send + Sync + 'static,
    {
        self.post_process = Some(Arc::new(post_process));
        self
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Parameters as given, before reference expansion
    pub fn params(&self) -> &Value {
        &self.params
    }

    /// Expand parameters against `state` and build the request this operation sends
    pub fn build_request(
        &self,
        state: &State,
        resolver: &dyn ReferenceResolver,
    ) -> Result<ODataRequest> {
        let expanded = resolver.expand(&self.params, state)?;
        let params = EntityParams::from_value(expanded)?;

        let configuration = &state.configuration;
        let authorization = configuration.authorization_header()?;
        let collection_url = configuration.entity_url(&params.entity_name)?;
        let method = self.kind.http_method();

        let request = match self.kind {
            OperationKind::Create => {
                let request = ODataRequest::new(method, collection_url, authorization);
                match params.body {
                    Some(body) => request.with_body(body),
                    None => request,
                }
            }
            OperationKind::Query => {
                let options = params.query.clone().unwrap_or_default();
                let mut url = match &params.entity_id {
                    Some(id) => format!("{}({})", collection_url, id.to_url_segment()),
                    None => collection_url,
                };
                if let Some(query_string) = options.to_encoded_query_string() {
                    url.push('?');
                    url.push_str(&query_string);
                }
                ODataRequest::new(method, url, authorization).with_header(
                    headers::PREFER,
                    format!("odata.maxpagesize={}", options.max_page_size()),
                )
            }
            OperationKind::Update => {
                let id = params.require_id(self.kind.operation_type())?;
                let url = format!("{}({})", collection_url, id.to_url_segment());
                let request = ODataRequest::new(method, url, authorization);
                match params.body {
                    Some(body) => request.with_body(body),
                    None => request,
                }
            }
            OperationKind::Delete => {
                let id = params.require_id(self.kind.operation_type())?;
                let url = format!("{}({})", collection_url, id.to_url_segment());
                ODataRequest::new(method, url, authorization)
            }
        };

        Ok(request)
    }

    /// Perform the operation: one request, then fold the response body into the next state
    pub async fn run(
        &self,
        state: State,
        transport: &dyn HttpTransport,
        resolver: &dyn ReferenceResolver,
    ) -> Result<State> {
        let request = self.build_request(&state, resolver)?;

        debug!("{} {}", request.method, request.url);
        if let Some(body) = &request.body {
            trace!("With body: {}", body);
        }

        let body = classify(transport.send(&request).await)
            .into_result()
            .inspect_err(|e| warn!("{} {} failed: {}", request.method, request.url, e))?;

        info!("{} succeeded: {}", self.kind.operation_type(), request.url);

        let next_state = state.with_response(body);
        match &self.post_process {
            Some(post_process) => post_process(next_state).map_err(AdaptorError::Step),
            None => Ok(next_state),
        }
    }
}
