//! Top-level error type for the fulfillment domain.
//!
//! [`FulfillmentError`] is what every handler returns. Store adapters report
//! [`crate::ports::StoreError`], which converts into
//! [`FulfillmentError::Upstream`]. Routing failures never appear here: the
//! router downgrades them to [`crate::RoutingOutcome::Error`] so the order is
//! still logged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::StoreError;

/// Errors surfaced by webhook handlers.
///
/// The HTTP layer maps each variant to a status code: `Validation` → 400,
/// `NotFound` → 404, `Upstream` → 500.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum FulfillmentError {
    /// The request is missing a required field or carries an unusable value.
    #[error("Invalid request: {message}")]
    Validation {
        /// Human-readable description of what was wrong.
        message: String,
    },

    /// The requested order (or other record) does not exist.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable description of what was looked up.
        message: String,
    },

    /// The backing store or another remote dependency failed.
    #[error("Upstream failure: {message}")]
    Upstream {
        /// Description of the failure as reported by the adapter.
        message: String,
    },
}

impl FulfillmentError {
    /// Shorthand for [`FulfillmentError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for [`FulfillmentError::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Shorthand for [`FulfillmentError::Upstream`].
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }
}

impl From<StoreError> for FulfillmentError {
    fn from(err: StoreError) -> Self {
        Self::upstream(err.to_string())
    }
}
