#[cfg(test)]
#[path = "speech_synthesizer_test.rs"]
mod tests;

use anyhow::Result;
use base64::engine::general_purpose;
use base64::Engine;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::AudioBuffer;
use crate::domain::models::Backend;
use crate::domain::models::Content;
use crate::domain::models::GenerationRequest;
use crate::domain::models::Modality;
use crate::domain::models::Role;
use crate::domain::models::SPEECH_CHANNELS;
use crate::domain::models::SPEECH_SAMPLE_RATE;

pub struct SpeechSynthesizer {
    model: String,
    voice: String,
}

impl Default for SpeechSynthesizer {
    fn default() -> SpeechSynthesizer {
        return SpeechSynthesizer::new(
            &Config::get(ConfigKey::SpeechModel),
            &Config::get(ConfigKey::Voice),
        );
    }
}

impl SpeechSynthesizer {
    pub fn new(model: &str, voice: &str) -> SpeechSynthesizer {
        return SpeechSynthesizer {
            model: model.to_string(),
            voice: voice.to_string(),
        };
    }

    pub fn build_request(&self, text: &str) -> GenerationRequest {
        let mut request = GenerationRequest::new(&self.model);
        request.contents = vec![Content::text(Role::User, text)];
        request.response_modalities = vec![Modality::Audio];
        request.voice = Some(self.voice.to_string());

        return request;
    }

    /// Reads `text` aloud. `Ok(None)` means the endpoint answered without an
    /// audio payload, or with an empty one, which is not an error. Transport
    /// and decode failures are.
    pub async fn synthesize(&self, backend: &dyn Backend, text: &str) -> Result<Option<AudioBuffer>> {
        let res = backend.generate_content(self.build_request(text)).await?;

        let audio = match res.audio {
            Some(audio) if !audio.data.trim().is_empty() => audio,
            _ => {
                tracing::warn!(
                    model = self.model.as_str(),
                    voice = self.voice.as_str(),
                    "Speech response contained no audio payload"
                );
                return Ok(None);
            }
        };

        let bytes = general_purpose::STANDARD.decode(audio.data.trim())?;
        let buffer = AudioBuffer::from_pcm16le(&bytes, SPEECH_SAMPLE_RATE, SPEECH_CHANNELS)?;

        tracing::debug!(
            mime_type = audio.mime_type.as_str(),
            frames = buffer.frames(),
            "Decoded speech"
        );

        return Ok(Some(buffer));
    }
}
