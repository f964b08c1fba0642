//! Discriminator codec: polymorphic wire (de)serialization.
//!
//! Decodes the tagged, nested inbound JSON document into the typed envelope
//! graph and re-encodes typed responses, honoring conditional-field and
//! directive-driven override semantics. The concrete type of every union
//! value is chosen by a string tag through a [`UnionRegistry`]; consumers
//! extend the codec purely by registration.
//!
//! Encode and decode are synchronous, pure, and hold no shared state.

mod error;
mod registry;
mod value;

pub use error::CodecError;
pub use registry::{AdjustFn, DecodeFn, FactoryFn, UnionRegistry};
pub use value::OneOrMany;

pub(crate) use value::{payload_from_value, tagged_object};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use crate::domain::request::{
    Context, PlaybackCommand, PlaybackControllerRequest, Request, RequestEnvelope, Session,
};
use crate::domain::response::{
    Card, Directive, OutputSpeech, PlainTextSpeech, Reprompt, ResponseBody, ResponseEnvelope,
    SsmlSpeech,
};
use crate::ports::{SerializationKind, TelemetrySink};

/// Bundles the union registries for every tagged family on the wire and
/// exposes whole-envelope decode/encode.
pub struct Codec {
    requests: UnionRegistry<Request>,
    speech: UnionRegistry<OutputSpeech>,
    cards: UnionRegistry<Card>,
    directives: UnionRegistry<Directive>,
}

impl Codec {
    /// A codec with empty registries. Useful for tests and for consumers
    /// that want full control over registration.
    pub fn new() -> Self {
        Codec {
            requests: UnionRegistry::new("request"),
            speech: UnionRegistry::new("outputSpeech"),
            cards: UnionRegistry::new("card"),
            directives: UnionRegistry::new("directive"),
        }
    }

    /// A codec pre-loaded with the platform's built-in variants.
    pub fn with_defaults() -> Self {
        let mut codec = Codec::new();
        codec.register_builtin_requests();
        codec.register_builtin_responses();
        codec
    }

    fn register_builtin_requests(&mut self) {
        self.requests
            .register_payload("LaunchRequest", Request::Launch);
        self.requests
            .register_payload("IntentRequest", Request::Intent);
        self.requests
            .register_payload("SessionEndedRequest", Request::SessionEnded);
        // One factory covers the whole dotted PlaybackController.* family:
        // the command lives in the sub-tag, not the payload.
        self.requests.register_factory(|tag, _value| {
            let sub_tag = tag.strip_prefix("PlaybackController.")?;
            let command = PlaybackCommand::from_sub_tag(sub_tag)?;
            Some(Arc::new(move |value: &Value| {
                let payload: PlaybackControllerRequest = payload_from_value(value)?;
                Ok(Request::PlaybackController(PlaybackControllerRequest {
                    command,
                    ..payload
                }))
            }) as DecodeFn<Request>)
        });
    }

    fn register_builtin_responses(&mut self) {
        self.speech.register_tag("PlainText", |value| {
            Ok(OutputSpeech::Plain(payload_from_value::<PlainTextSpeech>(
                value,
            )?))
        });
        self.speech.register_tag("SSML", |value| {
            Ok(OutputSpeech::Ssml(payload_from_value::<SsmlSpeech>(value)?))
        });

        self.cards.register_payload("Simple", Card::Simple);
        self.cards.register_payload("Standard", Card::Standard);
        self.cards
            .register_tag("LinkAccount", |_value| Ok(Card::LinkAccount));
        self.cards
            .register_payload("AskForPermissionsConsent", Card::AskForPermissionsConsent);

        self.directives
            .register_payload("AudioPlayer.Play", Directive::AudioPlayerPlay);
        self.directives
            .register_tag("AudioPlayer.Stop", |_value| Ok(Directive::AudioPlayerStop));
        self.directives
            .register_payload("AudioPlayer.ClearQueue", Directive::AudioPlayerClearQueue);
        self.directives.register_payload("Hint", Directive::Hint);
        self.directives
            .register_payload("VideoApp.Launch", Directive::VideoAppLaunch);
    }

    /// Request union registration surface.
    pub fn requests_mut(&mut self) -> &mut UnionRegistry<Request> {
        &mut self.requests
    }

    /// Output-speech union registration surface.
    pub fn speech_mut(&mut self) -> &mut UnionRegistry<OutputSpeech> {
        &mut self.speech
    }

    /// Card union registration surface.
    pub fn cards_mut(&mut self) -> &mut UnionRegistry<Card> {
        &mut self.cards
    }

    /// Directive union registration surface.
    pub fn directives_mut(&mut self) -> &mut UnionRegistry<Directive> {
        &mut self.directives
    }

    /// Decodes an inbound envelope from raw bytes, reporting the elapsed
    /// time to the telemetry sink regardless of outcome.
    pub fn decode_request_envelope_timed(
        &self,
        bytes: &[u8],
        telemetry: &dyn TelemetrySink,
    ) -> Result<RequestEnvelope, CodecError> {
        let started = Instant::now();
        let result = self.decode_request_envelope(bytes);
        telemetry.serialization_timed(SerializationKind::DecodeRequest, started.elapsed());
        result
    }

    /// Encodes an outbound envelope to bytes, reporting the elapsed time
    /// to the telemetry sink regardless of outcome.
    pub fn encode_response_envelope_timed(
        &self,
        envelope: &ResponseEnvelope,
        telemetry: &dyn TelemetrySink,
    ) -> Result<Vec<u8>, CodecError> {
        let started = Instant::now();
        let result = self.encode_response_envelope(envelope);
        telemetry.serialization_timed(SerializationKind::EncodeResponse, started.elapsed());
        result
    }

    /// Decodes an outbound envelope from bytes, reporting the elapsed time
    /// to the telemetry sink regardless of outcome.
    pub fn decode_response_envelope_timed(
        &self,
        bytes: &[u8],
        telemetry: &dyn TelemetrySink,
    ) -> Result<ResponseEnvelope, CodecError> {
        let started = Instant::now();
        let result = self.decode_response_envelope(bytes);
        telemetry.serialization_timed(SerializationKind::DecodeResponse, started.elapsed());
        result
    }

    /// Decodes an inbound envelope from raw bytes.
    pub fn decode_request_envelope(&self, bytes: &[u8]) -> Result<RequestEnvelope, CodecError> {
        let value: Value = serde_json::from_slice(bytes)?;
        let object = value
            .as_object()
            .ok_or_else(|| CodecError::malformed("envelope must be a JSON object"))?;

        let version = object
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| CodecError::malformed("envelope is missing 'version'"))?
            .to_string();

        let session: Option<Session> = match object.get("session") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(serde_json::from_value(raw.clone())?),
        };

        let context: Context = match object.get("context") {
            None | Some(Value::Null) => {
                return Err(CodecError::malformed("envelope is missing 'context'"))
            }
            Some(raw) => serde_json::from_value(raw.clone())?,
        };

        let request = object
            .get("request")
            .ok_or_else(|| CodecError::malformed("envelope is missing 'request'"))?;
        let request = self.requests.decode(request)?;

        Ok(RequestEnvelope {
            version,
            session,
            context,
            request,
        })
    }

    /// Encodes a request envelope back to bytes. Primarily a test aid; the
    /// core produces responses, not requests.
    pub fn encode_request_envelope(&self, envelope: &RequestEnvelope) -> Result<Vec<u8>, CodecError> {
        let mut object = Map::new();
        object.insert(
            "version".to_string(),
            Value::String(envelope.version.clone()),
        );
        if let Some(session) = &envelope.session {
            object.insert("session".to_string(), serde_json::to_value(session)?);
        }
        object.insert("context".to_string(), serde_json::to_value(&envelope.context)?);
        object.insert(
            "request".to_string(),
            envelope.request.to_value(self.requests.tag_field())?,
        );
        Ok(serde_json::to_vec(&Value::Object(object))?)
    }

    /// Encodes an outbound envelope to bytes. Conditional fields are
    /// omitted entirely (never emitted as null) and `shouldEndSession` is
    /// the directive-aggregated value.
    pub fn encode_response_envelope(
        &self,
        envelope: &ResponseEnvelope,
    ) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(envelope)?)
    }

    /// Decodes an outbound envelope from bytes, routing every union field
    /// through its registry.
    pub fn decode_response_envelope(&self, bytes: &[u8]) -> Result<ResponseEnvelope, CodecError> {
        let value: Value = serde_json::from_slice(bytes)?;
        let object = value
            .as_object()
            .ok_or_else(|| CodecError::malformed("envelope must be a JSON object"))?;

        let version = object
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| CodecError::malformed("envelope is missing 'version'"))?
            .to_string();

        let session_attributes: Option<HashMap<String, Value>> =
            match object.get("sessionAttributes") {
                None | Some(Value::Null) => None,
                Some(raw) => Some(serde_json::from_value(raw.clone())?),
            };

        let response = object
            .get("response")
            .ok_or_else(|| CodecError::malformed("envelope is missing 'response'"))?;
        let response = self.decode_response_body(response)?;

        Ok(ResponseEnvelope {
            version,
            session_attributes,
            response,
        })
    }

    fn decode_response_body(&self, value: &Value) -> Result<ResponseBody, CodecError> {
        let object = value
            .as_object()
            .ok_or_else(|| CodecError::malformed("response must be a JSON object"))?;

        let output_speech = match object.get("outputSpeech") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(self.speech.decode(raw)?),
        };

        let card = match object.get("card") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(self.cards.decode(raw)?),
        };

        let reprompt = match object.get("reprompt").and_then(|r| r.get("outputSpeech")) {
            None => None,
            Some(raw) => Some(Reprompt {
                output_speech: self.speech.decode(raw)?,
            }),
        };

        // Directives tolerate both a single object and an array on decode,
        // and always re-encode as an array.
        let mut directives = OneOrMany::always_array();
        match object.get("directives") {
            None | Some(Value::Null) => {}
            Some(Value::Array(raw_directives)) => {
                for raw in raw_directives {
                    directives.push(self.directives.decode(raw)?);
                }
            }
            Some(raw) => directives.push(self.directives.decode(raw)?),
        }

        let should_end_session = match object.get("shouldEndSession") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(raw.as_bool().ok_or_else(|| {
                CodecError::malformed("'shouldEndSession' must be a boolean")
            })?),
        };

        Ok(ResponseBody {
            output_speech,
            card,
            reprompt,
            directives,
            should_end_session,
        })
    }
}

impl Default for Codec {
    fn default() -> Self {
        Codec::with_defaults()
    }
}

static DEFAULT_CODEC: Lazy<Codec> = Lazy::new(Codec::with_defaults);

/// The process-wide codec with the built-in variants registered.
pub fn default_codec() -> &'static Codec {
    &DEFAULT_CODEC
}
