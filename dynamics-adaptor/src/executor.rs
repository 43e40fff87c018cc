//! Sequential execution of operations
//!
//! An [`Adaptor`] owns the injected transport and reference resolver and threads
//! a [`State`] through a list of operations, one at a time. The first failing
//! operation stops the run.

use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::api::operations::{EntityOperation, StateFn};
use crate::api::transport::{HttpTransport, ReqwestTransport};
use crate::error::{AdaptorError, Result};
use crate::references::{PathResolver, ReferenceResolver};
use crate::state::State;

/// A pipeline step: consumes a state and produces the next one
#[async_trait]
pub trait Operation: Send + Sync {
    async fn apply(&self, state: State, adaptor: &Adaptor) -> Result<State>;

    /// Short label used in logs
    fn describe(&self) -> String;

    fn boxed(self) -> Box<dyn Operation>
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}

#[async_trait]
impl Operation for EntityOperation {
    async fn apply(&self, state: State, adaptor: &Adaptor) -> Result<State> {
        self.run(state, adaptor.transport(), adaptor.resolver()).await
    }

    fn describe(&self) -> String {
        let entity = self
            .params()
            .get("entityName")
            .and_then(Value::as_str)
            .unwrap_or("<unresolved>");
        format!("{} {}", self.kind().operation_type(), entity)
    }
}

/// Step that applies a host function to the state without any request
#[derive(Clone)]
pub struct AlterState {
    alter: StateFn,
}

/// Wrap a host function as a pipeline step
pub fn alter_state<F>(alter: F) -> AlterState
where
    F: Fn(State) -> anyhow::Result<State> + Send + Sync + 'static,
{
    AlterState {
        alter: Arc::new(alter),
    }
}

impl fmt::Debug for AlterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AlterState")
    }
}

#[async_trait]
impl Operation for AlterState {
    async fn apply(&self, state: State, _adaptor: &Adaptor) -> Result<State> {
        (self.alter)(state).map_err(AdaptorError::Step)
    }

    fn describe(&self) -> String {
        "alter state".to_string()
    }
}

/// Runs operations against a transport, expanding references with a resolver
#[derive(Clone)]
pub struct Adaptor {
    transport: Arc<dyn HttpTransport>,
    resolver: Arc<dyn ReferenceResolver>,
}

impl Default for Adaptor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Adaptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adaptor").finish_non_exhaustive()
    }
}

impl Adaptor {
    /// Adaptor using `reqwest` and `$.data` / `$.references` path expansion
    pub fn new() -> Self {
        Self::with_transport(Arc::new(ReqwestTransport::new()))
    }

    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            resolver: Arc::new(PathResolver),
        }
    }

    /// Replace the reference resolver
    pub fn with_resolver(mut self, resolver: Arc<dyn ReferenceResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn transport(&self) -> &dyn HttpTransport {
        self.transport.as_ref()
    }

    pub fn resolver(&self) -> &dyn ReferenceResolver {
        self.resolver.as_ref()
    }

    /// Apply operations in order; the next one starts only after the previous resolved
    pub async fn execute(&self, operations: &[Box<dyn Operation>], state: State) -> Result<State> {
        let total = operations.len();
        let mut state = state;

        for (index, operation) in operations.iter().enumerate() {
            let label = operation.describe();
            debug!("Step {}/{}: {}", index + 1, total, label);

            state = match operation.apply(state, self).await {
                Ok(next) => next,
                Err(e) => {
                    warn!("Step {}/{} ({}) failed: {}", index + 1, total, label, e);
                    return Err(e);
                }
            };
        }

        info!("Completed {} operation(s)", total);
        Ok(state)
    }

    /// Execute against a host-provided JSON state, seeding `references` and `data`
    pub async fn execute_host_state(
        &self,
        operations: &[Box<dyn Operation>],
        host_state: Value,
    ) -> Result<State> {
        self.execute(operations, State::from_host(host_state)?).await
    }
}
