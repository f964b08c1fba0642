//! Outbound response envelope and session-continuation aggregation.

use std::collections::HashMap;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::codec::OneOrMany;

use super::card::Card;
use super::directive::Directive;
use super::speech::OutputSpeech;

/// Wire version emitted on every outbound envelope.
pub const ENVELOPE_VERSION: &str = "1.0";

/// Top-level outbound wire object:
/// `{ version, sessionAttributes?, response }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_attributes: Option<HashMap<String, Value>>,
    pub response: ResponseBody,
}

impl ResponseEnvelope {
    pub fn new(response: ResponseBody) -> Self {
        ResponseEnvelope {
            version: ENVELOPE_VERSION.to_string(),
            session_attributes: None,
            response,
        }
    }

    pub fn with_session_attributes(mut self, attributes: HashMap<String, Value>) -> Self {
        self.session_attributes = Some(attributes);
        self
    }
}

/// The response body: speech, card, reprompt, directives and the derived
/// session-continuation flag.
///
/// `should_end_session` holds the caller's *explicit* tri-state intent;
/// what goes on the wire is [`ResponseBody::effective_end_session`], which
/// lets continuation-affecting directives override it when they agree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResponseBody {
    pub output_speech: Option<OutputSpeech>,
    pub card: Option<Card>,
    pub reprompt: Option<Reprompt>,
    pub directives: OneOrMany<Directive>,
    pub should_end_session: Option<bool>,
}

/// Speech replayed when the user does not answer within the timeout.
/// Decoding goes through the discriminator codec, so only `Serialize` is
/// derived here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

impl ResponseBody {
    /// An empty body with everything undetermined. Directives encode as an
    /// array whenever present, per the platform contract.
    pub fn empty() -> Self {
        ResponseBody {
            directives: OneOrMany::always_array(),
            ..ResponseBody::default()
        }
    }

    /// Speaks and ends the session.
    pub fn tell(speech: OutputSpeech) -> Self {
        let mut body = ResponseBody::empty();
        body.output_speech = Some(speech);
        body.should_end_session = Some(true);
        body
    }

    /// Speaks, sets a reprompt and keeps the session open.
    pub fn ask(speech: OutputSpeech, reprompt: OutputSpeech) -> Self {
        let mut body = ResponseBody::empty();
        body.output_speech = Some(speech);
        body.reprompt = Some(Reprompt {
            output_speech: reprompt,
        });
        body.should_end_session = Some(false);
        body
    }

    pub fn with_card(mut self, card: Card) -> Self {
        self.card = Some(card);
        self
    }

    pub fn with_directive(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }

    /// Computes the wire value of `shouldEndSession`.
    ///
    /// If no directive implements the session-continuation capability, the
    /// explicitly-set value wins. Otherwise the qualifying directives'
    /// signals are collected: if they all agree, the common value wins; on
    /// disagreement the explicit value wins again.
    pub fn effective_end_session(&self) -> Option<bool> {
        let mut signals = self
            .directives
            .iter()
            .filter_map(Directive::session_continuation);
        match signals.next() {
            None => self.should_end_session,
            Some(first) => {
                if signals.all(|signal| signal == first) {
                    Some(first)
                } else {
                    self.should_end_session
                }
            }
        }
    }
}

impl Serialize for ResponseBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let end_session = self.effective_end_session();
        let mut len = 0;
        len += usize::from(self.output_speech.is_some());
        len += usize::from(self.card.is_some());
        len += usize::from(self.reprompt.is_some());
        len += usize::from(!self.directives.is_empty());
        len += usize::from(end_session.is_some());

        let mut state = serializer.serialize_struct("ResponseBody", len)?;
        if let Some(speech) = &self.output_speech {
            state.serialize_field("outputSpeech", speech)?;
        }
        if let Some(card) = &self.card {
            state.serialize_field("card", card)?;
        }
        if let Some(reprompt) = &self.reprompt {
            state.serialize_field("reprompt", reprompt)?;
        }
        if !self.directives.is_empty() {
            state.serialize_field("directives", &self.directives)?;
        }
        if let Some(end) = end_session {
            state.serialize_field("shouldEndSession", &end)?;
        }
        state.end()
    }
}
