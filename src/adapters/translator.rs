//! Default exception translator adapter.

use async_trait::async_trait;

use crate::application::{DispatchError, HandlerContext};
use crate::domain::response::{OutputSpeech, ResponseBody, ResponseEnvelope};
use crate::ports::ExceptionTranslator;

/// Translates any handler fault into a spoken apology that ends the
/// session. Swap it out for a skill-specific translator to customize the
/// error surface.
pub struct ApologyTranslator {
    message: String,
}

impl ApologyTranslator {
    pub fn new(message: impl Into<String>) -> Self {
        ApologyTranslator {
            message: message.into(),
        }
    }
}

impl Default for ApologyTranslator {
    fn default() -> Self {
        ApologyTranslator::new("Sorry, something went wrong handling that request.")
    }
}

#[async_trait]
impl ExceptionTranslator for ApologyTranslator {
    async fn translate(
        &self,
        _ctx: &HandlerContext,
        _fault: &DispatchError,
    ) -> Option<ResponseEnvelope> {
        Some(ResponseEnvelope::new(ResponseBody::tell(
            OutputSpeech::plain(self.message.clone()),
        )))
    }
}
