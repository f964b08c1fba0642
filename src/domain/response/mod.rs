//! Outbound envelope model: the response side of the wire contract.

mod card;
mod directive;
mod envelope;
mod speech;

pub use card::{Card, CardImage, PermissionsConsentCard, SimpleCard, StandardCard};
pub use directive::{
    AudioItem, AudioPlayerPlayDirective, ClearQueueDirective, CustomDirective, Directive,
    HintDirective, HintText, Stream, VideoAppLaunchDirective, VideoAppLaunchVideoMetadata,
    VideoItem,
};
pub use envelope::{Reprompt, ResponseBody, ResponseEnvelope, ENVELOPE_VERSION};
pub use speech::{OutputSpeech, PlainTextSpeech, SsmlSpeech};
