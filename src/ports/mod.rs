//! Ports: trait seams between the dispatch core and its collaborators.

mod interceptor;
mod telemetry;
mod translator;

pub use interceptor::{RequestInterceptor, ResponseInterceptor};
pub use telemetry::{SerializationKind, TelemetrySink, UnitOutcome};
pub use translator::ExceptionTranslator;
