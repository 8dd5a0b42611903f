#[cfg(test)]
#[path = "story_generator_test.rs"]
mod tests;

use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::prompts::STORY_FALLBACK;
use crate::domain::models::prompts::STORY_PROMPT;
use crate::domain::models::Backend;
use crate::domain::models::Content;
use crate::domain::models::GenerationRequest;
use crate::domain::models::ImagePayload;
use crate::domain::models::Part;
use crate::domain::models::Role;

pub struct StoryGenerator {
    model: String,
}

impl Default for StoryGenerator {
    fn default() -> StoryGenerator {
        return StoryGenerator::new(&Config::get(ConfigKey::StoryModel));
    }
}

impl StoryGenerator {
    pub fn new(model: &str) -> StoryGenerator {
        return StoryGenerator {
            model: model.to_string(),
        };
    }

    pub fn build_request(&self, image: &ImagePayload) -> GenerationRequest {
        let mut request = GenerationRequest::new(&self.model);
        request.contents = vec![Content {
            role: Role::User,
            parts: vec![Part::from(image), Part::Text(STORY_PROMPT.to_string())],
        }];

        return request;
    }

    /// Writes the opening of a story inspired by `image`. Endpoint failures
    /// are returned as is; an answer without text becomes the fallback line.
    pub async fn generate(&self, backend: &dyn Backend, image: &ImagePayload) -> Result<String> {
        if !image.is_supported() {
            tracing::warn!(
                media_type = image.media_type(),
                "Generating a story from an unsupported image type"
            );
        }

        let res = backend.generate_content(self.build_request(image)).await?;

        match res.text {
            Some(text) if !text.trim().is_empty() => return Ok(text),
            _ => {
                tracing::warn!(model = self.model.as_str(), "Story generation returned no text");
                return Ok(STORY_FALLBACK.to_string());
            }
        }
    }
}
