//! Response classification shared by every operation

use serde_json::Value;

use super::constants::SUCCESS_STATUSES;
use super::transport::RawResponse;
use crate::error::{AdaptorError, Result, TransportError};

/// Outcome of a single request
#[derive(Debug)]
pub enum ResponseOutcome {
    /// Status 200, 201 or 202; carries the response body
    Ok(Value),
    /// The client failed before a status was available
    TransportErr(TransportError),
    /// The server answered with any other status
    StatusErr(u16),
}

/// Classify a transport result
///
/// A transport error wins without looking at any status; otherwise only
/// 200/201/202 count as success.
pub fn classify(result: std::result::Result<RawResponse, TransportError>) -> ResponseOutcome {
    match result {
        Err(err) => ResponseOutcome::TransportErr(err),
        Ok(response) if SUCCESS_STATUSES.contains(&response.status) => {
            ResponseOutcome::Ok(response.body)
        }
        Ok(response) => ResponseOutcome::StatusErr(response.status),
    }
}

impl ResponseOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn into_result(self) -> Result<Value> {
        match self {
            Self::Ok(body) => Ok(body),
            Self::TransportErr(err) => Err(AdaptorError::Transport(err)),
            Self::StatusErr(status) => Err(AdaptorError::HttpStatus { status }),
        }
    }
}
