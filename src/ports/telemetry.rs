//! Telemetry side-channel port.
//!
//! The dispatch core reports every predicate evaluation, handler execution
//! and serialization timing here; what happens to the measurements is the
//! adapter's business. Implementations must be cheap and must not fail:
//! this is a fire-and-forget seam, not a hard dependency.

use std::time::Duration;

/// Outcome of one observed unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    Succeeded,
    Failed,
    Canceled,
}

/// Which serialization operation was timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationKind {
    DecodeRequest,
    DecodeResponse,
    EncodeResponse,
}

/// Consumer of the dispatch core's operational measurements.
pub trait TelemetrySink: Send + Sync {
    /// One acceptance-predicate call finished. `accepted` is `None` when
    /// the predicate itself faulted.
    fn predicate_evaluated(
        &self,
        handler: &str,
        is_default: bool,
        accepted: Option<bool>,
        elapsed: Duration,
    );

    /// One handler invocation finished.
    fn handler_executed(
        &self,
        handler: &str,
        is_default: bool,
        outcome: UnitOutcome,
        elapsed: Duration,
    );

    /// One codec operation finished.
    fn serialization_timed(&self, kind: SerializationKind, elapsed: Duration);
}
