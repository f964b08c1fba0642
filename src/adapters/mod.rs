//! Adapters: provided implementations of the port traits.

mod telemetry;
mod translator;

pub use telemetry::{NoopTelemetry, TracingTelemetry};
pub use translator::ApologyTranslator;
