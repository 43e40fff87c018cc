//! OData query options
//!
//! Declarative `$select` / `$orderby` / `$filter` options and the page-size
//! limit carried by query operations.

pub mod options;
pub mod orderby;

pub use options::QueryOptions;
pub use orderby::{OrderBy, SortDirection};
