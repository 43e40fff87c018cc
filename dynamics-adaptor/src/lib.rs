//! Dynamics 365 entity operations for workflow pipelines
//!
//! Each operation takes declarative parameters, expands references to earlier
//! results, issues one OData request and folds the response into the next
//! [`State`]. An [`Adaptor`] runs operations strictly in sequence.
//!
//! ```no_run
//! use dynamics_adaptor::{Adaptor, Configuration, Operation, State, alter_state, create_entity, query};
//! use serde_json::json;
//!
//! # async fn run() -> dynamics_adaptor::Result<()> {
//! let state = State::new(Configuration::with_resource("https://org.crm.dynamics.com", "9.1", "token"));
//!
//! let operations = vec![
//!     create_entity(json!({"entityName": "accounts", "body": {"name": "Acme"}})).boxed(),
//!     query(json!({"entityName": "accounts", "query": {"filter": "name eq 'Acme'", "limit": 1}})).boxed(),
//!     alter_state(|state| {
//!         let body = state.response_body().cloned().unwrap_or_default();
//!         Ok(state.with_data(body))
//!     })
//!     .boxed(),
//! ];
//!
//! let final_state = Adaptor::new().execute(&operations, state).await?;
//! println!("{}", final_state.data);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod executor;
pub mod references;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{
    EntityOperation, HttpTransport, ODataRequest, OrderBy, QueryOptions, RawResponse,
    ReqwestTransport, SortDirection, create_entity, delete_entity, query, update_entity,
};
pub use config::{AuthScheme, Configuration};
pub use error::{AdaptorError, Result, TransportError};
pub use executor::{Adaptor, AlterState, Operation, alter_state};
pub use references::{PathResolver, ReferenceResolver};
pub use state::{ResponseEnvelope, State};
