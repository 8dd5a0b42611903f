#[cfg(test)]
#[path = "story_test.rs"]
mod tests;

use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use super::AudioBuffer;
use super::ImagePayload;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum StoryPhase {
    Idle,
    ImageSelected,
    StoryGenerating,
    StoryReady,
    AudioPlaying,
}

pub fn story_key(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    return hasher.finish();
}

/// Synthesized speech together with the story text it was made from.
#[derive(Clone, Debug)]
pub struct CachedAudio {
    pub story_key: u64,
    pub buffer: AudioBuffer,
}

#[derive(Clone, Debug, Default)]
pub struct StoryState {
    pub image: Option<ImagePayload>,
    pub generated_text: Option<String>,
    pub is_generating: bool,
    pub cached_audio: Option<CachedAudio>,
    pub is_playing_audio: bool,
}

impl StoryState {
    pub fn phase(&self) -> StoryPhase {
        if self.is_playing_audio {
            return StoryPhase::AudioPlaying;
        }
        if self.is_generating {
            return StoryPhase::StoryGenerating;
        }
        if self.generated_text.is_some() {
            return StoryPhase::StoryReady;
        }
        if self.image.is_some() {
            return StoryPhase::ImageSelected;
        }

        return StoryPhase::Idle;
    }

    pub fn media_type(&self) -> Option<&str> {
        return self.image.as_ref().map(|image| return image.media_type());
    }

    /// Only hands back audio made from the story currently on display.
    pub fn audio_for_current_story(&self) -> Option<&AudioBuffer> {
        let text = self.generated_text.as_ref()?;
        let cached = self.cached_audio.as_ref()?;
        if cached.story_key != story_key(text) {
            return None;
        }

        return Some(&cached.buffer);
    }

    pub fn cache_audio(&mut self, buffer: AudioBuffer) {
        if let Some(text) = &self.generated_text {
            self.cached_audio = Some(CachedAudio {
                story_key: story_key(text),
                buffer,
            });
        }
    }
}
