//! Error types for the wire codec.

use thiserror::Error;

/// Errors produced while decoding or encoding tagged wire payloads.
///
/// Both variants are non-retryable at this layer; disposition is the
/// caller's decision.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The discriminator tag did not resolve to any registered type,
    /// data-driven factory, or fallback.
    #[error("unknown '{union}' variant tag '{tag}'")]
    UnknownVariant {
        /// Union family the tag was looked up in (e.g. "request").
        union: &'static str,
        /// The offending discriminator value.
        tag: String,
        /// Raw payload fragment, kept for stateless diagnosis.
        fragment: serde_json::Value,
    },

    /// The payload was not valid JSON or did not match the expected shape.
    #[error("malformed payload: {reason}")]
    MalformedPayload { reason: String },
}

impl CodecError {
    /// Creates an unknown-variant error carrying the offending tag and payload.
    pub fn unknown_variant(
        union: &'static str,
        tag: impl Into<String>,
        fragment: &serde_json::Value,
    ) -> Self {
        CodecError::UnknownVariant {
            union,
            tag: tag.into(),
            fragment: fragment.clone(),
        }
    }

    /// Creates a malformed-payload error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        CodecError::MalformedPayload {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::malformed(err.to_string())
    }
}
