//! Envelope model: typed request and response wire objects.

pub mod request;
pub mod response;
