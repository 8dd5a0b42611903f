#[cfg(test)]
#[path = "story_session_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;

use super::ConversationAgent;
use super::SpeechSynthesizer;
use super::StoryGenerator;
use crate::domain::models::prompts::STORY_UNAVAILABLE;
use crate::domain::models::AudioBuffer;
use crate::domain::models::Backend;
use crate::domain::models::ChatMessage;
use crate::domain::models::ConversationTurn;
use crate::domain::models::ImagePayload;
use crate::domain::models::Role;
use crate::domain::models::StoryPhase;
use crate::domain::models::StoryState;

/// Everything one user is doing with one story: the image, the generated
/// text, any synthesized audio, and the conversation about it. Nothing
/// outlives the session.
pub struct StorySession {
    story_generator: StoryGenerator,
    speech_synthesizer: SpeechSynthesizer,
    conversation_agent: ConversationAgent,
    state: StoryState,
    transcript: Vec<ChatMessage>,
    // Transcript entries from this index on are about the current story.
    grounded_from: usize,
    next_message_id: u64,
    is_loading: bool,
}

impl Default for StorySession {
    fn default() -> StorySession {
        return StorySession::new(
            StoryGenerator::default(),
            SpeechSynthesizer::default(),
            ConversationAgent::default(),
        );
    }
}

impl StorySession {
    pub fn new(
        story_generator: StoryGenerator,
        speech_synthesizer: SpeechSynthesizer,
        conversation_agent: ConversationAgent,
    ) -> StorySession {
        return StorySession {
            story_generator,
            speech_synthesizer,
            conversation_agent,
            state: StoryState::default(),
            transcript: vec![],
            grounded_from: 0,
            next_message_id: 1,
            is_loading: false,
        };
    }

    pub fn phase(&self) -> StoryPhase {
        return self.state.phase();
    }

    pub fn state(&self) -> &StoryState {
        return &self.state;
    }

    pub fn story(&self) -> Option<&str> {
        return self.state.generated_text.as_deref();
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        return &self.transcript;
    }

    pub fn is_loading(&self) -> bool {
        return self.is_loading;
    }

    /// Starts over with a new image. The previous story and its audio go
    /// with it; the conversation is left alone.
    pub fn select_image(&mut self, image: ImagePayload) {
        self.state = StoryState {
            image: Some(image),
            ..StoryState::default()
        };
    }

    /// Always lands in `StoryReady`. A failed request shows a fixed message
    /// in place of the story.
    pub async fn generate_story(&mut self, backend: &dyn Backend) -> Result<&str> {
        let image = match &self.state.image {
            Some(image) => image.clone(),
            None => bail!("Select an image before generating a story"),
        };

        self.stop_audio();
        self.state.cached_audio = None;
        self.state.generated_text = None;
        self.state.is_generating = true;

        let text = match self.story_generator.generate(backend, &image).await {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(error = ?err, "Failed to generate story");
                STORY_UNAVAILABLE.to_string()
            }
        };

        self.state.generated_text = Some(text);
        self.state.is_generating = false;
        self.grounded_from = self.transcript.len();

        return Ok(self.story().unwrap_or(STORY_UNAVAILABLE));
    }

    /// Replays cached audio when it was made from the current story,
    /// otherwise synthesizes it. `None` leaves the story ready for another
    /// attempt.
    pub async fn read_aloud(&mut self, backend: &dyn Backend) -> Result<Option<&AudioBuffer>> {
        let text = match &self.state.generated_text {
            Some(text) => text.to_string(),
            None => bail!("There is no story to read aloud yet"),
        };

        self.stop_audio();

        if self.state.audio_for_current_story().is_none() {
            match self.speech_synthesizer.synthesize(backend, &text).await {
                Ok(Some(buffer)) => self.state.cache_audio(buffer),
                Ok(None) => return Ok(None),
                Err(err) => {
                    tracing::error!(error = ?err, "Failed to synthesize speech");
                    return Ok(None);
                }
            }
        } else {
            tracing::debug!("Replaying cached story audio");
        }

        self.state.is_playing_audio = true;

        return Ok(self.state.audio_for_current_story());
    }

    /// Only ends playback. Requests already in flight are not cancelled.
    pub fn stop_audio(&mut self) {
        self.state.is_playing_audio = false;
    }

    /// Sends one question to the co-author and records both sides of the
    /// exchange, user first. Only the conversation about the current story
    /// is sent as history, so the first question after a new story carries
    /// it again.
    pub async fn ask(&mut self, backend: &dyn Backend, text: &str) -> Result<&ChatMessage> {
        let story = match &self.state.generated_text {
            Some(story) => story.to_string(),
            None => bail!("There is no story to talk about yet"),
        };

        let history = self.transcript[self.grounded_from..]
            .iter()
            .map(|message| return message.to_turn())
            .collect::<Vec<ConversationTurn>>();
        self.push_message(Role::User, text);

        self.is_loading = true;
        let reply = self
            .conversation_agent
            .respond(backend, &history, text, Some(&story))
            .await;
        self.is_loading = false;

        self.push_message(Role::Model, &reply);

        return Ok(&self.transcript[self.transcript.len() - 1]);
    }

    /// Back to `Idle`, dropping the image, story, audio and conversation.
    pub fn reset(&mut self) {
        self.state = StoryState::default();
        self.transcript.clear();
        self.grounded_from = 0;
        self.is_loading = false;
    }

    fn push_message(&mut self, role: Role, text: &str) {
        let message = ChatMessage::new(self.next_message_id, role, text);
        self.next_message_id += 1;
        self.transcript.push(message);
    }
}
