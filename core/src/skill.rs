//! Request and response envelopes exchanged with the voice platform.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::slots::Slot;
use crate::speech::Speech;

pub const ENVELOPE_VERSION: &str = "1.0";

/// Incoming turn as posted by the voice platform.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub session: Option<SessionInfo>,
    #[serde(default)]
    pub context: Option<Context>,
    /// `LaunchRequest`, `IntentRequest` or `SessionEndedRequest`
    #[schema(value_type = Object)]
    pub request: TurnRequest,
}

impl RequestEnvelope {
    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.session_id.as_str())
    }

    /// Linked-account token, from the session or from the system context.
    pub fn access_token(&self) -> Option<&str> {
        let from_session = self
            .session
            .as_ref()
            .and_then(|s| s.user.as_ref())
            .and_then(|u| u.access_token.as_deref());
        let from_context = || {
            self.context
                .as_ref()
                .and_then(|c| c.system.as_ref())
                .and_then(|s| s.user.as_ref())
                .and_then(|u| u.access_token.as_deref())
        };
        from_session.or_else(from_context).filter(|t| !t.is_empty())
    }

    /// Whether the device can render display templates.
    pub fn supports_display(&self) -> bool {
        self.context
            .as_ref()
            .and_then(|c| c.system.as_ref())
            .and_then(|s| s.device.as_ref())
            .is_some_and(|d| d.supported_interfaces.contains_key("Display"))
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: String,
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub user: Option<PlatformUser>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformUser {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct Context {
    #[serde(rename = "System", default)]
    pub system: Option<SystemContext>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SystemContext {
    #[serde(default)]
    pub device: Option<Device>,
    #[serde(default)]
    pub user: Option<PlatformUser>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default)]
    pub supported_interfaces: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum TurnRequest {
    LaunchRequest,
    IntentRequest(IntentRequest),
    SessionEndedRequest(SessionEndedRequest),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRequest {
    pub intent: Intent,
    #[serde(default)]
    pub dialog_state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionEndedRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Intent {
    pub name: String,
    #[serde(default)]
    pub slots: HashMap<String, Slot>,
}

/// Outgoing response envelope.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResponseEnvelope {
    pub version: String,
    pub response: ResponseBody,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub card: Option<Card>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[schema(value_type = Vec<Object>)]
    pub directives: Vec<Directive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_end_session: Option<bool>,
}

impl ResponseBody {
    /// Spoken response that ends the session unless told otherwise.
    pub fn speak(speech: &Speech) -> Self {
        Self {
            output_speech: Some(OutputSpeech::ssml(speech)),
            should_end_session: Some(true),
            ..Self::default()
        }
    }

    pub fn reprompt(mut self, speech: &Speech) -> Self {
        self.reprompt = Some(Reprompt {
            output_speech: OutputSpeech::ssml(speech),
        });
        self
    }

    pub fn card(mut self, card: Card) -> Self {
        self.card = Some(card);
        self
    }

    pub fn directive(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }

    pub fn keep_open(mut self) -> Self {
        self.should_end_session = Some(false);
        self
    }

    pub fn ends_session(&self) -> bool {
        self.should_end_session.unwrap_or(true)
    }

    pub fn into_envelope(self) -> ResponseEnvelope {
        ResponseEnvelope {
            version: ENVELOPE_VERSION.to_string(),
            response: self,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OutputSpeech {
    #[serde(rename = "type")]
    pub kind: String,
    pub ssml: String,
}

impl OutputSpeech {
    pub fn ssml(speech: &Speech) -> Self {
        Self {
            kind: "SSML".to_string(),
            ssml: speech.to_ssml(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Card {
    Standard(StandardCard),
    LinkAccount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardCard {
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<CardImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardImage {
    pub large_image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Directive {
    #[serde(rename = "Dialog.ElicitSlot")]
    ElicitSlot(ElicitSlot),
    #[serde(rename = "Display.RenderTemplate")]
    RenderTemplate(RenderTemplate),
}

/// Ask the platform to collect one named slot next, restating the intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElicitSlot {
    pub slot_to_elicit: String,
    pub updated_intent: UpdatedIntent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedIntent {
    pub name: String,
    pub confirmation_status: String,
    pub slots: HashMap<String, UpdatedSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedSlot {
    pub name: String,
    pub confirmation_status: String,
}

impl ElicitSlot {
    /// Elicit `slot_to_elicit`, restating `slot_names` with cleared
    /// confirmation status.
    pub fn new(intent: &str, slot_to_elicit: &str, slot_names: &[&str]) -> Self {
        let slots = slot_names
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    UpdatedSlot {
                        name: name.to_string(),
                        confirmation_status: "NONE".to_string(),
                    },
                )
            })
            .collect();
        Self {
            slot_to_elicit: slot_to_elicit.to_string(),
            updated_intent: UpdatedIntent {
                name: intent.to_string(),
                confirmation_status: "NONE".to_string(),
                slots,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderTemplate {
    pub template: BodyTemplate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyTemplate {
    #[serde(rename = "type")]
    pub kind: String,
    pub token: String,
    pub back_button: String,
    pub image: TemplateImage,
    pub title: String,
    pub text_content: TextContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateImage {
    pub sources: Vec<ImageSource>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSource {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    pub primary_text: RichText,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RichText {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
}
