//! Errors raised by row stores.

use fulfillment::StoreError;
use thiserror::Error;

/// Failure talking to a row store.
#[derive(Debug, Error)]
pub enum SheetError {
    /// The named table (spreadsheet tab) does not exist.
    #[error("table '{table}' does not exist")]
    TableNotFound {
        /// Table that was requested.
        table: String,
    },

    /// The HTTP request could not be completed.
    #[error("request to spreadsheet API failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The spreadsheet API answered with a non-success status.
    #[error("spreadsheet API returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or error message.
        message: String,
    },

    /// A response or stored row could not be interpreted.
    #[error("malformed spreadsheet data: {message}")]
    Malformed {
        /// What could not be read.
        message: String,
    },

    /// The store was switched offline (test doubles only).
    #[error("row store is offline")]
    Offline,
}

impl From<SheetError> for StoreError {
    fn from(err: SheetError) -> Self {
        match err {
            SheetError::TableNotFound { .. } | SheetError::Malformed { .. } => {
                StoreError::Malformed {
                    message: err.to_string(),
                }
            }
            SheetError::Transport(_) | SheetError::Api { .. } | SheetError::Offline => {
                StoreError::Unavailable {
                    message: err.to_string(),
                }
            }
        }
    }
}
