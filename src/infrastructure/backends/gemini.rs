#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::GenerationRequest;
use crate::domain::models::GenerationResponse;
use crate::domain::models::InlineData;
use crate::domain::models::Part;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Model {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ModelListResponse {
    #[serde(default)]
    models: Vec<Model>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentPartsBlob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum ContentParts {
    Text(String),
    InlineData(ContentPartsBlob),
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<ContentParts>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SystemInstruction {
    parts: Vec<ContentParts>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

// Responses may carry parts with extra fields (thought signatures and the
// like), so they are read loosely rather than through `ContentParts`.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<ContentPartsBlob>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl From<&GenerationRequest> for CompletionRequest {
    fn from(request: &GenerationRequest) -> CompletionRequest {
        let contents = request
            .contents
            .iter()
            .map(|content| {
                return Content {
                    role: content.role.to_string(),
                    parts: content.parts.iter().map(to_content_parts).collect(),
                };
            })
            .collect::<Vec<Content>>();

        let system_instruction = request.system_instruction.as_ref().map(|text| {
            return SystemInstruction {
                parts: vec![ContentParts::Text(text.to_string())],
            };
        });

        let mut generation_config = None;
        if !request.response_modalities.is_empty() {
            generation_config = Some(GenerationConfig {
                response_modalities: request
                    .response_modalities
                    .iter()
                    .map(|modality| return modality.to_string())
                    .collect(),
                speech_config: request.voice.as_ref().map(|voice| {
                    return SpeechConfig {
                        voice_config: VoiceConfig {
                            prebuilt_voice_config: PrebuiltVoiceConfig {
                                voice_name: voice.to_string(),
                            },
                        },
                    };
                }),
            });
        }

        return CompletionRequest {
            contents,
            system_instruction,
            generation_config,
        };
    }
}

impl From<GenerateContentResponse> for GenerationResponse {
    fn from(res: GenerateContentResponse) -> GenerationResponse {
        let parts = res
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| return candidate.content)
            .map(|content| return content.parts)
            .unwrap_or_default();

        let text_parts = parts
            .iter()
            .filter_map(|part| return part.text.clone())
            .collect::<Vec<String>>();
        let text = if text_parts.is_empty() {
            None
        } else {
            Some(text_parts.join(""))
        };

        let audio = parts.into_iter().find_map(|part| {
            return part.inline_data.map(|blob| {
                return InlineData {
                    mime_type: blob.mime_type,
                    data: blob.data,
                };
            });
        });

        return GenerationResponse { text, audio };
    }
}

fn to_content_parts(part: &Part) -> ContentParts {
    match part {
        Part::Text(text) => return ContentParts::Text(text.to_string()),
        Part::InlineData(inline) => {
            return ContentParts::InlineData(ContentPartsBlob {
                mime_type: inline.mime_type.to_string(),
                data: inline.data.to_string(),
            });
        }
    }
}

fn model_path(model: &str) -> String {
    if model.starts_with("models/") {
        return model.to_string();
    }

    return format!("models/{model}");
}

pub struct Gemini {
    client: reqwest::Client,
    url: String,
    token: String,
    model: String,
    timeout: String,
}

impl Default for Gemini {
    fn default() -> Gemini {
        return Gemini {
            client: reqwest::Client::new(),
            url: Config::get(ConfigKey::ApiURL),
            token: Config::get(ConfigKey::ApiKey),
            model: Config::get(ConfigKey::StoryModel),
            timeout: Config::get(ConfigKey::BackendHealthCheckTimeout),
        };
    }
}

#[async_trait]
impl Backend for Gemini {
    fn name(&self) -> BackendName {
        return BackendName::Gemini;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Gemini URL is not defined");
        }
        if self.token.is_empty() {
            bail!("Gemini API key is not defined");
        }

        let res = self
            .client
            .get(format!(
                "{url}/v1beta/{model}",
                url = self.url,
                model = model_path(&self.model)
            ))
            .header("x-goog-api-key", &self.token)
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        let status = match res {
            Ok(res) => res.status().as_u16(),
            Err(err) => {
                tracing::error!(error = ?err, "Gemini is not reachable");
                bail!("Gemini is not reachable");
            }
        };

        if status >= 400 {
            tracing::error!(status = status, "Gemini health check failed");
            bail!(format!("Gemini health check failed, {status}"));
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn list_models(&self) -> Result<Vec<String>> {
        let res = self
            .client
            .get(format!("{url}/v1beta/models", url = self.url))
            .header("x-goog-api-key", &self.token)
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                "Failed to list models from Gemini"
            );
            bail!(format!(
                "Failed to list models from Gemini, {}",
                res.status().as_u16()
            ));
        }

        let mut models: Vec<String> = res
            .json::<ModelListResponse>()
            .await?
            .models
            .iter()
            .filter(|model| {
                return model
                    .supported_generation_methods
                    .contains(&"generateContent".to_string());
            })
            .map(|model| {
                return model.name.trim_start_matches("models/").to_string();
            })
            .collect();

        models.sort();

        return Ok(models);
    }

    #[allow(clippy::implicit_return)]
    async fn generate_content(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        let req = CompletionRequest::from(&request);

        tracing::debug!(
            model = request.model.as_str(),
            contents = req.contents.len(),
            prompt = request.last_user_text().unwrap_or_default(),
            "Sending generation request to Gemini"
        );

        let res = self
            .client
            .post(format!(
                "{url}/v1beta/{model}:generateContent",
                url = self.url,
                model = model_path(&request.model),
            ))
            .header("x-goog-api-key", &self.token)
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                model = request.model.as_str(),
                "Failed to make generation request to Gemini"
            );
            bail!(format!(
                "Failed to make generation request to Gemini, {}",
                res.status().as_u16()
            ));
        }

        let body = res.json::<GenerateContentResponse>().await?;

        return Ok(GenerationResponse::from(body));
    }
}
