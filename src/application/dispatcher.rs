//! Dispatch wrapper: resolves which handler answers a request.
//!
//! One wrapper exists per concrete request type (cached by the mediator).
//! It walks the pre-sorted candidates, invokes the first acceptor, and owns
//! the default-handler fallback. Every predicate call and every handler
//! invocation is individually timed and reported to the telemetry sink.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::request::RequestKind;
use crate::domain::response::ResponseEnvelope;
use crate::ports::{TelemetrySink, UnitOutcome};

use super::error::DispatchError;
use super::handler::HandlerContext;
use super::registry::Registration;

/// Stateless dispatcher for one concrete request type. Instances are
/// functionally interchangeable, so a raced duplicate is harmless.
pub struct DispatchWrapper {
    kind: RequestKind,
    registration: Option<Arc<Registration>>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl DispatchWrapper {
    pub fn new(
        kind: RequestKind,
        registration: Option<Arc<Registration>>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        DispatchWrapper {
            kind,
            registration,
            telemetry,
        }
    }

    pub fn kind(&self) -> &RequestKind {
        &self.kind
    }

    /// Resolves and invokes the winning handler.
    ///
    /// Candidates are consulted in their fixed registration order; the
    /// first whose predicate accepts is invoked and no further candidate is
    /// evaluated. If none accepts, the default handler (which may itself
    /// decline) gets the request; otherwise the call fails with
    /// `NoHandlerFound`.
    pub async fn handle(
        &self,
        ctx: &HandlerContext,
        cancel: &CancellationToken,
    ) -> Result<ResponseEnvelope, DispatchError> {
        let Some(registration) = &self.registration else {
            return Err(self.no_handler(ctx));
        };

        for candidate in registration.candidates() {
            if cancel.is_cancelled() {
                return Err(DispatchError::Canceled);
            }
            let name = candidate.name().to_string();
            let accepted = self
                .timed_predicate(&name, false, candidate.can_handle(ctx, cancel))
                .await?;
            if accepted {
                debug!(handler = %name, kind = %self.kind, "candidate accepted request");
                return self
                    .timed_invocation(&name, false, candidate.handle(ctx, cancel))
                    .await;
            }
        }

        if let Some(default_handler) = registration.default_handler() {
            if cancel.is_cancelled() {
                return Err(DispatchError::Canceled);
            }
            let name = default_handler.name().to_string();
            let accepted = self
                .timed_predicate(&name, true, default_handler.can_handle(ctx, cancel))
                .await?;
            if accepted {
                debug!(handler = %name, kind = %self.kind, "default handler accepted request");
                return self
                    .timed_invocation(&name, true, default_handler.handle(ctx, cancel))
                    .await;
            }
        }

        Err(self.no_handler(ctx))
    }

    fn no_handler(&self, ctx: &HandlerContext) -> DispatchError {
        warn!(kind = %self.kind, "no handler accepted request");
        DispatchError::NoHandlerFound {
            request_kind: self.kind.to_string(),
            request_id: ctx.request_id().map(str::to_string),
        }
    }

    async fn timed_predicate<F>(
        &self,
        name: &str,
        is_default: bool,
        predicate: F,
    ) -> Result<bool, DispatchError>
    where
        F: Future<Output = Result<bool, DispatchError>>,
    {
        let started = Instant::now();
        let result = predicate.await;
        let accepted = result.as_ref().ok().copied();
        self.telemetry
            .predicate_evaluated(name, is_default, accepted, started.elapsed());
        result
    }

    async fn timed_invocation<F>(
        &self,
        name: &str,
        is_default: bool,
        invocation: F,
    ) -> Result<ResponseEnvelope, DispatchError>
    where
        F: Future<Output = Result<ResponseEnvelope, DispatchError>>,
    {
        let started = Instant::now();
        let result = invocation.await;
        let outcome = match &result {
            Ok(_) => UnitOutcome::Succeeded,
            Err(err) if err.is_canceled() => UnitOutcome::Canceled,
            Err(_) => UnitOutcome::Failed,
        };
        self.telemetry
            .handler_executed(name, is_default, outcome, started.elapsed());
        result
    }
}
