//! Entity operations
//!
//! The four CRUD operation builders and the parameters they accept. Each
//! operation issues exactly one request and folds the response body into the
//! next pipeline state.

pub mod operation;
pub mod params;

pub use operation::{
    EntityOperation, OperationKind, StateFn, create_entity, delete_entity, query, update_entity,
};
pub use params::{EntityId, EntityParams};
