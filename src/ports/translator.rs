//! Exception translation port.

use async_trait::async_trait;

use crate::application::{DispatchError, HandlerContext};
use crate::domain::response::ResponseEnvelope;

/// Converts a handler fault into a platform-shaped error response.
///
/// Returning `None` declines translation; the fault then propagates to the
/// caller unchanged. Cancellation and identity failures are never offered
/// for translation.
#[async_trait]
pub trait ExceptionTranslator: Send + Sync {
    async fn translate(
        &self,
        ctx: &HandlerContext,
        fault: &DispatchError,
    ) -> Option<ResponseEnvelope>;
}
