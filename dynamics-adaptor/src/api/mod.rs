//! Dynamics 365 Web API request layer
//!
//! Builds OData requests for entity operations, sends them through a pluggable
//! transport, and classifies the outcome.

pub mod constants;
pub mod operations;
pub mod query;
pub mod request;
pub mod response;
pub mod transport;

pub use operations::{
    EntityId, EntityOperation, EntityParams, OperationKind, StateFn, create_entity,
    delete_entity, query, update_entity,
};
pub use query::{OrderBy, QueryOptions, SortDirection};
pub use request::ODataRequest;
pub use response::{ResponseOutcome, classify};
pub use transport::{HttpTransport, RawResponse, ReqwestTransport};
