//! Directive union: device instructions attached to a response.
//!
//! Some directives implement the session-continuation capability: they
//! signal whether issuing them should end the skill session. The response
//! body aggregates those signals (see `ResponseBody::effective_end_session`).

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::codec::{tagged_object, CodecError};

/// The directive union, tagged on the wire with dotted names like
/// `AudioPlayer.Play`. Consumer-registered shapes decode into
/// [`CustomDirective`].
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    AudioPlayerPlay(AudioPlayerPlayDirective),
    AudioPlayerStop,
    AudioPlayerClearQueue(ClearQueueDirective),
    Hint(HintDirective),
    VideoAppLaunch(VideoAppLaunchDirective),
    Custom(CustomDirective),
}

/// Starts or enqueues an audio stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioPlayerPlayDirective {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_behavior: Option<String>,
    pub audio_item: AudioItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioItem {
    pub stream: Stream,
}

/// A playable stream. `offsetInMilliseconds` is required by the platform
/// contract and is always emitted, even at zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    pub url: String,
    pub token: String,
    #[serde(default)]
    pub offset_in_milliseconds: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearQueueDirective {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_behavior: Option<String>,
}

/// A textual hint shown on screen-capable devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintDirective {
    pub hint: HintText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintText {
    pub text: String,
}

/// Hands the session over to the platform video player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAppLaunchDirective {
    pub video_item: VideoItem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAppLaunchVideoMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VideoAppLaunchVideoMetadata>,
}

/// A consumer-registered directive shape. The raw payload is carried as-is;
/// `session_continuation` never touches the wire and is set by the
/// registering code (typically via a registry adjuster).
#[derive(Debug, Clone, PartialEq)]
pub struct CustomDirective {
    pub tag: String,
    pub payload: Value,
    pub session_continuation: Option<bool>,
}

impl CustomDirective {
    pub fn new(tag: impl Into<String>, payload: Value) -> Self {
        CustomDirective {
            tag: tag.into(),
            payload,
            session_continuation: None,
        }
    }

    /// Marks this directive as participating in session-continuation
    /// aggregation with the given signal.
    pub fn with_session_continuation(mut self, ends_session: bool) -> Self {
        self.session_continuation = Some(ends_session);
        self
    }
}

impl Directive {
    /// The wire discriminator tag for this variant.
    pub fn tag(&self) -> &str {
        match self {
            Directive::AudioPlayerPlay(_) => "AudioPlayer.Play",
            Directive::AudioPlayerStop => "AudioPlayer.Stop",
            Directive::AudioPlayerClearQueue(_) => "AudioPlayer.ClearQueue",
            Directive::Hint(_) => "Hint",
            Directive::VideoAppLaunch(_) => "VideoApp.Launch",
            Directive::Custom(custom) => custom.tag.as_str(),
        }
    }

    /// The session-continuation capability: `Some(v)` means this directive
    /// signals that the session should (`true`) or should not (`false`)
    /// end; `None` means it does not participate in aggregation.
    ///
    /// `AudioPlayer.Play` and `VideoApp.Launch` both hand playback to the
    /// platform and signal that the skill session ends.
    pub fn session_continuation(&self) -> Option<bool> {
        match self {
            Directive::AudioPlayerPlay(_) => Some(true),
            Directive::VideoAppLaunch(_) => Some(true),
            Directive::Custom(custom) => custom.session_continuation,
            _ => None,
        }
    }

    pub fn to_value(&self) -> Result<Value, CodecError> {
        match self {
            Directive::AudioPlayerPlay(directive) => tagged_object("type", self.tag(), directive),
            Directive::AudioPlayerStop => tagged_object("type", self.tag(), &()),
            Directive::AudioPlayerClearQueue(directive) => {
                tagged_object("type", self.tag(), directive)
            }
            Directive::Hint(directive) => tagged_object("type", self.tag(), directive),
            Directive::VideoAppLaunch(directive) => tagged_object("type", self.tag(), directive),
            Directive::Custom(custom) => {
                let mut value = custom.payload.clone();
                match value {
                    Value::Object(ref mut map) => {
                        map.insert("type".to_string(), Value::String(custom.tag.clone()));
                        Ok(value)
                    }
                    _ => Err(CodecError::malformed(
                        "custom directive payload must be a JSON object",
                    )),
                }
            }
        }
    }
}

impl Serialize for Directive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stream_offset_is_emitted_at_zero() {
        let directive = Directive::AudioPlayerPlay(AudioPlayerPlayDirective {
            play_behavior: None,
            audio_item: AudioItem {
                stream: Stream {
                    url: "https://example.com/a.mp3".to_string(),
                    token: "t-1".to_string(),
                    offset_in_milliseconds: 0,
                },
            },
        });
        let value = serde_json::to_value(&directive).unwrap();
        assert_eq!(value["type"], "AudioPlayer.Play");
        assert_eq!(value["audioItem"]["stream"]["offsetInMilliseconds"], 0);
        assert!(value.get("playBehavior").is_none());
    }

    #[test]
    fn stop_directive_is_tag_only() {
        let value = serde_json::to_value(Directive::AudioPlayerStop).unwrap();
        assert_eq!(value, json!({"type": "AudioPlayer.Stop"}));
    }

    #[test]
    fn continuation_capability_by_variant() {
        assert_eq!(Directive::AudioPlayerStop.session_continuation(), None);
        let hint = Directive::Hint(HintDirective {
            hint: HintText {
                text: "try this".to_string(),
            },
        });
        assert_eq!(hint.session_continuation(), None);
        let video = Directive::VideoAppLaunch(VideoAppLaunchDirective {
            video_item: VideoItem {
                source: "https://example.com/v.mp4".to_string(),
                metadata: None,
            },
        });
        assert_eq!(video.session_continuation(), Some(true));
    }

    #[test]
    fn custom_directive_keeps_capability_off_the_wire() {
        let directive = Directive::Custom(
            CustomDirective::new("Display.RenderTemplate", json!({"template": {}}))
                .with_session_continuation(false),
        );
        let value = serde_json::to_value(&directive).unwrap();
        assert_eq!(value["type"], "Display.RenderTemplate");
        assert!(value.get("session_continuation").is_none());
        assert!(value.get("sessionContinuation").is_none());
    }
}
