//! Telemetry sink adapters.

use std::time::Duration;

use tracing::debug;

use crate::ports::{SerializationKind, TelemetrySink, UnitOutcome};

/// Emits every measurement as a `tracing` debug event. Suitable when the
/// host already ships spans to a collector.
#[derive(Default)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn predicate_evaluated(
        &self,
        handler: &str,
        is_default: bool,
        accepted: Option<bool>,
        elapsed: Duration,
    ) {
        debug!(
            handler,
            is_default,
            accepted = ?accepted,
            elapsed_us = elapsed.as_micros() as u64,
            "predicate evaluated"
        );
    }

    fn handler_executed(
        &self,
        handler: &str,
        is_default: bool,
        outcome: UnitOutcome,
        elapsed: Duration,
    ) {
        debug!(
            handler,
            is_default,
            outcome = ?outcome,
            elapsed_us = elapsed.as_micros() as u64,
            "handler executed"
        );
    }

    fn serialization_timed(&self, kind: SerializationKind, elapsed: Duration) {
        debug!(
            kind = ?kind,
            elapsed_us = elapsed.as_micros() as u64,
            "serialization timed"
        );
    }
}

/// Discards every measurement. Used in tests and by hosts that opt out of
/// telemetry entirely.
#[derive(Default)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn predicate_evaluated(
        &self,
        _handler: &str,
        _is_default: bool,
        _accepted: Option<bool>,
        _elapsed: Duration,
    ) {
    }

    fn handler_executed(
        &self,
        _handler: &str,
        _is_default: bool,
        _outcome: UnitOutcome,
        _elapsed: Duration,
    ) {
    }

    fn serialization_timed(&self, _kind: SerializationKind, _elapsed: Duration) {}
}
