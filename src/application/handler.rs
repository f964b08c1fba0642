//! Handler traits and the per-call context they receive.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::request::{Request, RequestEnvelope, RequestKind};
use crate::domain::response::ResponseEnvelope;

use super::error::DispatchError;

/// Per-call context handed to every behavior, interceptor and handler.
/// Holds no mutable state; the envelope is owned by this call.
#[derive(Debug)]
pub struct HandlerContext {
    envelope: RequestEnvelope,
    correlation_id: Uuid,
}

impl HandlerContext {
    pub fn new(envelope: RequestEnvelope) -> Self {
        HandlerContext {
            envelope,
            correlation_id: Uuid::new_v4(),
        }
    }

    pub fn envelope(&self) -> &RequestEnvelope {
        &self.envelope
    }

    pub fn request(&self) -> &Request {
        &self.envelope.request
    }

    pub fn request_kind(&self) -> RequestKind {
        self.envelope.request.kind()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.envelope.request.request_id()
    }

    /// Correlation id generated per call, carried through tracing spans.
    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// A candidate handler competing for requests of one concrete type.
///
/// `can_handle` is an acceptance predicate: it answers with an explicit
/// boolean, and an `Err` from it is a genuine fault, never a polite "no".
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Stable implementation name. Used as the deterministic ordering
    /// tie-break and as the telemetry tag, so it must not change between
    /// registrations.
    fn name(&self) -> &str;

    async fn can_handle(
        &self,
        ctx: &HandlerContext,
        cancel: &CancellationToken,
    ) -> Result<bool, DispatchError>;

    async fn handle(
        &self,
        ctx: &HandlerContext,
        cancel: &CancellationToken,
    ) -> Result<ResponseEnvelope, DispatchError>;
}

/// The fallback handler consulted when no candidate accepts. Accepts
/// everything unless `can_handle` is overridden.
#[async_trait]
pub trait DefaultRequestHandler: Send + Sync {
    fn name(&self) -> &str;

    async fn can_handle(
        &self,
        _ctx: &HandlerContext,
        _cancel: &CancellationToken,
    ) -> Result<bool, DispatchError> {
        Ok(true)
    }

    async fn handle(
        &self,
        ctx: &HandlerContext,
        cancel: &CancellationToken,
    ) -> Result<ResponseEnvelope, DispatchError>;
}

/// How long a registered handler instance lives. Supplied by the external
/// registration mechanism; the registry itself treats handlers as opaque
/// shared values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandlerLifetime {
    #[default]
    Singleton,
    PerRequest,
}

/// Plain registration metadata for one handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Resolution order: lower runs first.
    pub priority: i32,
    /// Excluded handlers are dropped at registry build time.
    pub exclude: bool,
    /// Instance lifetime hint consumed by the host's registration
    /// mechanism when it constructs handler instances. The registry never
    /// reads it; registered handlers are opaque shared values here.
    pub lifetime: HandlerLifetime,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        HandlerConfig {
            priority: 0,
            exclude: false,
            lifetime: HandlerLifetime::Singleton,
        }
    }
}

impl HandlerConfig {
    pub fn with_priority(priority: i32) -> Self {
        HandlerConfig {
            priority,
            ..HandlerConfig::default()
        }
    }
}
