//! Request/response interceptor ports, consumed by the standard behavior
//! chain links.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::application::{DispatchError, HandlerContext};
use crate::domain::response::ResponseEnvelope;

/// Runs before handler resolution. Failing aborts the call.
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    async fn intercept(
        &self,
        ctx: &HandlerContext,
        cancel: &CancellationToken,
    ) -> Result<(), DispatchError>;
}

/// Runs after a response is produced and may rewrite it.
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    async fn intercept(
        &self,
        ctx: &HandlerContext,
        response: ResponseEnvelope,
        cancel: &CancellationToken,
    ) -> Result<ResponseEnvelope, DispatchError>;
}
