//! Card union: visual companion content rendered by the platform app.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::codec::{tagged_object, CodecError};

/// The response card, a tagged union on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Card {
    Simple(SimpleCard),
    Standard(StandardCard),
    LinkAccount,
    AskForPermissionsConsent(PermissionsConsentCard),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleCard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardCard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<CardImage>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub large_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsConsentCard {
    pub permissions: Vec<String>,
}

impl Card {
    pub fn simple(title: impl Into<String>, content: impl Into<String>) -> Self {
        Card::Simple(SimpleCard {
            title: Some(title.into()),
            content: Some(content.into()),
        })
    }

    /// The wire discriminator tag for this variant.
    pub fn tag(&self) -> &'static str {
        match self {
            Card::Simple(_) => "Simple",
            Card::Standard(_) => "Standard",
            Card::LinkAccount => "LinkAccount",
            Card::AskForPermissionsConsent(_) => "AskForPermissionsConsent",
        }
    }

    pub fn to_value(&self) -> Result<Value, CodecError> {
        match self {
            Card::Simple(card) => tagged_object("type", self.tag(), card),
            Card::Standard(card) => tagged_object("type", self.tag(), card),
            Card::LinkAccount => tagged_object("type", self.tag(), &()),
            Card::AskForPermissionsConsent(card) => tagged_object("type", self.tag(), card),
        }
    }
}

impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}
