//! Outermost behavior: per-call latency measurement and span context.

use std::time::Instant;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

use crate::domain::response::ResponseEnvelope;

use super::super::error::DispatchError;
use super::super::handler::HandlerContext;
use super::{Next, PipelineBehavior};

/// Times the whole pipeline and logs the outcome under a per-call span
/// carrying the correlation id and request kind.
#[derive(Default)]
pub struct PerformanceBehavior;

impl PerformanceBehavior {
    pub fn new() -> Self {
        PerformanceBehavior
    }
}

#[async_trait]
impl PipelineBehavior for PerformanceBehavior {
    async fn handle(
        &self,
        ctx: &HandlerContext,
        cancel: &CancellationToken,
        next: Next<'_>,
    ) -> Result<ResponseEnvelope, DispatchError> {
        let span = info_span!(
            "skill_request",
            correlation_id = %ctx.correlation_id(),
            kind = %ctx.request_kind(),
            request_id = ctx.request_id().unwrap_or(""),
        );
        async move {
            let started = Instant::now();
            let result = next.run(ctx, cancel).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &result {
                Ok(_) => info!(elapsed_ms, "request handled"),
                Err(err) if err.is_canceled() => info!(elapsed_ms, "request canceled"),
                Err(err) => warn!(elapsed_ms, error = %err, "request failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}
