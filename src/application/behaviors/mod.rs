//! Behavior chain: ordered cross-cutting wrappers around dispatch.
//!
//! Behaviors execute outermost-first in registration order; the dispatch
//! wrapper is always the innermost link. The chain is strictly sequential
//! per request; concurrency exists only across distinct requests.

mod exception;
mod interceptors;
mod performance;

pub use exception::ExceptionTranslationBehavior;
pub use interceptors::{RequestInterceptorBehavior, ResponseInterceptorBehavior};
pub use performance::PerformanceBehavior;

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::response::ResponseEnvelope;
use crate::ports::{ExceptionTranslator, RequestInterceptor, ResponseInterceptor};

use super::dispatcher::DispatchWrapper;
use super::error::DispatchError;
use super::handler::HandlerContext;

/// One cross-cutting link in the chain. `next` invokes the remainder of
/// the chain, ending in the dispatch wrapper.
#[async_trait]
pub trait PipelineBehavior: Send + Sync {
    async fn handle(
        &self,
        ctx: &HandlerContext,
        cancel: &CancellationToken,
        next: Next<'_>,
    ) -> Result<ResponseEnvelope, DispatchError>;
}

/// The remainder of the chain from one behavior's point of view.
pub struct Next<'a> {
    behaviors: &'a [Arc<dyn PipelineBehavior>],
    dispatcher: &'a DispatchWrapper,
}

impl<'a> Next<'a> {
    pub(crate) fn new(
        behaviors: &'a [Arc<dyn PipelineBehavior>],
        dispatcher: &'a DispatchWrapper,
    ) -> Self {
        Next {
            behaviors,
            dispatcher,
        }
    }

    /// Runs the rest of the chain and, at the end, the dispatch wrapper.
    pub async fn run(
        self,
        ctx: &HandlerContext,
        cancel: &CancellationToken,
    ) -> Result<ResponseEnvelope, DispatchError> {
        match self.behaviors.split_first() {
            Some((head, rest)) => {
                head.handle(ctx, cancel, Next::new(rest, self.dispatcher))
                    .await
            }
            None => self.dispatcher.handle(ctx, cancel).await,
        }
    }
}

/// The platform-supplied chain in its standard outer-to-inner order:
/// performance measurement, request interceptors, response interceptors,
/// exception translation. Consumers append their own behaviors to the
/// returned list.
pub fn standard_behaviors(
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
    translator: Arc<dyn ExceptionTranslator>,
) -> Vec<Arc<dyn PipelineBehavior>> {
    vec![
        Arc::new(PerformanceBehavior::new()),
        Arc::new(RequestInterceptorBehavior::new(request_interceptors)),
        Arc::new(ResponseInterceptorBehavior::new(response_interceptors)),
        Arc::new(ExceptionTranslationBehavior::new(translator)),
    ]
}
