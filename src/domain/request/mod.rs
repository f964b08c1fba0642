//! Inbound envelope model: the request side of the wire contract.

mod envelope;
pub(crate) mod types;

pub use envelope::{
    Application, Context, Device, RequestEnvelope, Session, SystemContext, User,
};
pub use types::{
    ExtensionRequest, Intent, IntentRequest, LaunchRequest, PlaybackCommand,
    PlaybackControllerRequest, Request, RequestBase, RequestKind, SessionEndedError,
    SessionEndedRequest, Slot,
};
