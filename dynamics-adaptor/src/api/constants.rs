//! Constants for the Dynamics 365 Web API

/// OData protocol version sent in both version headers
pub const ODATA_VERSION: &str = "4.0";

/// Path segment between the organization resource and the API version
pub const WEB_API_PATH: &str = "api/data";

/// Status codes treated as a successful operation
pub const SUCCESS_STATUSES: [u16; 3] = [200, 201, 202];

pub mod headers {
    pub const ODATA_MAX_VERSION: &str = "OData-MaxVersion";
    pub const ODATA_VERSION: &str = "OData-Version";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const PREFER: &str = "Prefer";

    pub const APPLICATION_JSON: &str = "application/json";
}
