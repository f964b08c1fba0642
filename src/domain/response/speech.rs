//! Output speech union: plain text or SSML.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::codec::{tagged_object, CodecError};

/// Spoken output, tagged on the wire as `PlainText` or `SSML`.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputSpeech {
    Plain(PlainTextSpeech),
    Ssml(SsmlSpeech),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainTextSpeech {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsmlSpeech {
    pub ssml: String,
}

impl OutputSpeech {
    pub fn plain(text: impl Into<String>) -> Self {
        OutputSpeech::Plain(PlainTextSpeech { text: text.into() })
    }

    pub fn ssml(ssml: impl Into<String>) -> Self {
        OutputSpeech::Ssml(SsmlSpeech { ssml: ssml.into() })
    }

    /// The wire discriminator tag for this variant.
    pub fn tag(&self) -> &'static str {
        match self {
            OutputSpeech::Plain(_) => "PlainText",
            OutputSpeech::Ssml(_) => "SSML",
        }
    }

    pub fn to_value(&self) -> Result<Value, CodecError> {
        match self {
            OutputSpeech::Plain(speech) => tagged_object("type", self.tag(), speech),
            OutputSpeech::Ssml(speech) => tagged_object("type", self.tag(), speech),
        }
    }
}

impl Serialize for OutputSpeech {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}
