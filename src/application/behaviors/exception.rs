//! Innermost standard behavior: translates handler faults into
//! platform-shaped error responses.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::domain::response::ResponseEnvelope;
use crate::ports::ExceptionTranslator;

use super::super::error::DispatchError;
use super::super::handler::HandlerContext;
use super::{Next, PipelineBehavior};

/// Catches `HandlerFault` from the remainder of the chain and offers it to
/// the configured translator. Cancellation, identity and lookup failures
/// pass through verbatim; a declining translator lets the fault propagate.
pub struct ExceptionTranslationBehavior {
    translator: Arc<dyn ExceptionTranslator>,
}

impl ExceptionTranslationBehavior {
    pub fn new(translator: Arc<dyn ExceptionTranslator>) -> Self {
        ExceptionTranslationBehavior { translator }
    }
}

#[async_trait]
impl PipelineBehavior for ExceptionTranslationBehavior {
    async fn handle(
        &self,
        ctx: &HandlerContext,
        cancel: &CancellationToken,
        next: Next<'_>,
    ) -> Result<ResponseEnvelope, DispatchError> {
        match next.run(ctx, cancel).await {
            Err(fault @ DispatchError::HandlerFault { .. }) => {
                match self.translator.translate(ctx, &fault).await {
                    Some(response) => {
                        warn!(error = %fault, "handler fault translated to error response");
                        Ok(response)
                    }
                    None => Err(fault),
                }
            }
            other => other,
        }
    }
}
