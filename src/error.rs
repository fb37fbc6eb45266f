use crate::domain::lesson::LessonId;
use crate::domain::order::OrderId;
use crate::domain::validation::ValidationState;
use std::time::Duration;
use thiserror::Error;

/// Message surfaced when the order service rejects a request without saying why.
pub const ORDER_FALLBACK_MESSAGE: &str = "Failed to place order";

/// Message surfaced when an order exists but lesson availability could not be updated.
pub const PARTIAL_FAILURE_MESSAGE: &str =
    "Your order was placed, but lesson availability could not be updated";

pub type Result<T> = std::result::Result<T, BookingError>;

/// Reasons a submission is refused before any request is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("{}", .0.summary())]
    InvalidForm(ValidationState),
    #[error("A submission is already in progress")]
    SubmissionInProgress,
    #[error("The previous order is still waiting for availability to be updated")]
    ReconciliationPending,
    #[error("No order is waiting for availability to be updated")]
    NothingToReconcile,
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("{0}")]
    Precondition(#[from] PreconditionError),
    #[error("{message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },
    #[error("order {order_id} was created but capacity updates failed for {} lesson(s)", failed.len())]
    PartialFailure {
        order_id: OrderId,
        failed: Vec<LessonId>,
    },
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Submission was cancelled")]
    Cancelled,
    #[error("Price must be between 0 and 1000000000")]
    InvalidPrice,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    Storage(#[from] rocksdb::Error),
}

impl BookingError {
    /// The single line shown to the customer for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::PartialFailure { .. } => PARTIAL_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for BookingError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}
