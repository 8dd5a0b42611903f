#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

use super::ConversationTurn;
use super::ImagePayload;
use super::Role;

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BackendName {
    Gemini,
}

impl BackendName {
    pub fn parse(text: String) -> Option<BackendName> {
        return BackendName::iter().find(|e| return e.to_string() == text);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Modality {
    Audio,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineData {
    pub mime_type: String,
    /// Base64 without any data URI header.
    pub data: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Part {
    Text(String),
    InlineData(InlineData),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: Role, text: &str) -> Content {
        return Content {
            role,
            parts: vec![Part::Text(text.to_string())],
        };
    }
}

impl From<&ConversationTurn> for Content {
    fn from(turn: &ConversationTurn) -> Content {
        return Content::text(turn.role, &turn.text);
    }
}

impl From<&ImagePayload> for Part {
    fn from(image: &ImagePayload) -> Part {
        return Part::InlineData(InlineData {
            mime_type: image.media_type().to_string(),
            data: image.to_base64(),
        });
    }
}

/// A single call to a generation endpoint, independent of any provider's
/// wire format.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub model: String,
    pub contents: Vec<Content>,
    pub system_instruction: Option<String>,
    pub response_modalities: Vec<Modality>,
    pub voice: Option<String>,
}

impl GenerationRequest {
    pub fn new(model: &str) -> GenerationRequest {
        return GenerationRequest {
            model: model.to_string(),
            ..GenerationRequest::default()
        };
    }

    /// Text of the last user turn, if any.
    pub fn last_user_text(&self) -> Option<&str> {
        return self
            .contents
            .iter()
            .rev()
            .find(|content| return content.role == Role::User)
            .and_then(|content| {
                return content.parts.iter().find_map(|part| {
                    if let Part::Text(text) = part {
                        return Some(text.as_str());
                    }
                    return None;
                });
            });
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationResponse {
    /// Concatenated text parts of the first candidate.
    pub text: Option<String>,
    /// First inline audio payload of the first candidate.
    pub audio: Option<InlineData>,
}

impl GenerationResponse {
    pub fn with_text(text: &str) -> GenerationResponse {
        return GenerationResponse {
            text: Some(text.to_string()),
            audio: None,
        };
    }

    pub fn with_audio(mime_type: &str, data: &str) -> GenerationResponse {
        return GenerationResponse {
            text: None,
            audio: Some(InlineData {
                mime_type: mime_type.to_string(),
                data: data.to_string(),
            }),
        };
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    fn name(&self) -> BackendName;

    /// Used at startup to verify the credential and endpoint are usable.
    async fn health_check(&self) -> Result<()>;

    /// Models that can serve `generate_content`.
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Issues exactly one request. Transport failures and non-success
    /// responses are errors. A response without text or audio is not.
    async fn generate_content(&self, request: GenerationRequest) -> Result<GenerationResponse>;
}

pub type BackendBox = Box<dyn Backend>;
