//! Error taxonomy for the dispatch pipeline.

use std::error::Error as StdError;

use thiserror::Error;

use crate::codec::CodecError;

/// Failures surfaced by the mediator and the behavior chain.
///
/// Nothing in this taxonomy is retried by the core; retry policy, if any,
/// belongs to the caller. Cancellation is a distinct outcome, never folded
/// into a generic failure.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The envelope's identity claim did not match the configured expected
    /// identity, or no expected identity is configured.
    #[error("application id verification failed (expected {expected:?}, got {actual:?})")]
    IdentityVerificationFailed {
        expected: Option<String>,
        actual: Option<String>,
    },

    /// No candidate accepted the request and no default handler took it.
    /// A configuration or programming error, fatal for the call.
    #[error("no handler accepted request type '{request_kind}' (request id {request_id:?})")]
    NoHandlerFound {
        request_kind: String,
        request_id: Option<String>,
    },

    /// A candidate's predicate or body failed.
    #[error("handler '{handler}' faulted: {source}")]
    HandlerFault {
        handler: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// The caller's cancellation signal fired. Propagated verbatim.
    #[error("operation canceled")]
    Canceled,

    /// A codec failure carried up to the pipeline caller.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl DispatchError {
    /// Wraps a handler's own error as a fault attributed to `handler`.
    pub fn handler_fault(
        handler: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        DispatchError::HandlerFault {
            handler: handler.into(),
            source: source.into(),
        }
    }

    /// True for the distinct cancellation outcome.
    pub fn is_canceled(&self) -> bool {
        matches!(self, DispatchError::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_fault_names_the_handler() {
        let err = DispatchError::handler_fault("OrderPizzaHandler", "oven offline");
        assert!(err.to_string().contains("OrderPizzaHandler"));
        assert!(err.to_string().contains("oven offline"));
    }

    #[test]
    fn canceled_is_distinct() {
        assert!(DispatchError::Canceled.is_canceled());
        assert!(!DispatchError::handler_fault("h", "boom").is_canceled());
    }
}
