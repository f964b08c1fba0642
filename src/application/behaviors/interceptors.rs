//! Interceptor behaviors: request-scoped pre-processing and
//! response-scoped post-processing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::response::ResponseEnvelope;
use crate::ports::{RequestInterceptor, ResponseInterceptor};

use super::super::error::DispatchError;
use super::super::handler::HandlerContext;
use super::{Next, PipelineBehavior};

/// Runs every registered request interceptor, in order, before the handler
/// resolves. An interceptor failure aborts the call.
pub struct RequestInterceptorBehavior {
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl RequestInterceptorBehavior {
    pub fn new(interceptors: Vec<Arc<dyn RequestInterceptor>>) -> Self {
        RequestInterceptorBehavior { interceptors }
    }
}

#[async_trait]
impl PipelineBehavior for RequestInterceptorBehavior {
    async fn handle(
        &self,
        ctx: &HandlerContext,
        cancel: &CancellationToken,
        next: Next<'_>,
    ) -> Result<ResponseEnvelope, DispatchError> {
        for interceptor in &self.interceptors {
            if cancel.is_cancelled() {
                return Err(DispatchError::Canceled);
            }
            interceptor.intercept(ctx, cancel).await?;
        }
        next.run(ctx, cancel).await
    }
}

/// Runs every registered response interceptor, in order, after a response
/// is produced. Each interceptor may rewrite the response.
pub struct ResponseInterceptorBehavior {
    interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl ResponseInterceptorBehavior {
    pub fn new(interceptors: Vec<Arc<dyn ResponseInterceptor>>) -> Self {
        ResponseInterceptorBehavior { interceptors }
    }
}

#[async_trait]
impl PipelineBehavior for ResponseInterceptorBehavior {
    async fn handle(
        &self,
        ctx: &HandlerContext,
        cancel: &CancellationToken,
        next: Next<'_>,
    ) -> Result<ResponseEnvelope, DispatchError> {
        let mut response = next.run(ctx, cancel).await?;
        for interceptor in &self.interceptors {
            if cancel.is_cancelled() {
                return Err(DispatchError::Canceled);
            }
            response = interceptor.intercept(ctx, response, cancel).await?;
        }
        Ok(response)
    }
}
