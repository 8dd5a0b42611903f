#[cfg(test)]
#[path = "conversation_agent_test.rs"]
mod tests;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::prompts::grounded_question;
use crate::domain::models::prompts::CHAT_APOLOGY;
use crate::domain::models::prompts::CHAT_PERSONA;
use crate::domain::models::Backend;
use crate::domain::models::Content;
use crate::domain::models::ConversationTurn;
use crate::domain::models::GenerationRequest;
use crate::domain::models::Role;

/// The co-author. Holds no conversation state: every call rebuilds the full
/// request from the history it is handed.
pub struct ConversationAgent {
    model: String,
}

impl Default for ConversationAgent {
    fn default() -> ConversationAgent {
        return ConversationAgent::new(&Config::get(ConfigKey::ChatModel));
    }
}

impl ConversationAgent {
    pub fn new(model: &str) -> ConversationAgent {
        return ConversationAgent {
            model: model.to_string(),
        };
    }

    /// The story is only woven into the very first question. Later turns
    /// already carry it through the history.
    pub fn build_request(
        &self,
        history: &[ConversationTurn],
        new_message: &str,
        seed_context: Option<&str>,
    ) -> GenerationRequest {
        let text = match seed_context {
            Some(story) if history.is_empty() && !story.is_empty() => {
                grounded_question(story, new_message)
            }
            _ => new_message.to_string(),
        };

        let mut contents = history.iter().map(Content::from).collect::<Vec<Content>>();
        contents.push(Content::text(Role::User, &text));

        let mut request = GenerationRequest::new(&self.model);
        request.contents = contents;
        request.system_instruction = Some(CHAT_PERSONA.to_string());

        return request;
    }

    /// Never fails. Anything that goes wrong is logged and answered with an
    /// apology so the chat always has something to show.
    pub async fn respond(
        &self,
        backend: &dyn Backend,
        history: &[ConversationTurn],
        new_message: &str,
        seed_context: Option<&str>,
    ) -> String {
        let request = self.build_request(history, new_message, seed_context);

        match backend.generate_content(request).await {
            Ok(res) => match res.text {
                Some(text) if !text.trim().is_empty() => return text,
                _ => {
                    tracing::warn!(model = self.model.as_str(), "Chat response contained no text");
                    return CHAT_APOLOGY.to_string();
                }
            },
            Err(err) => {
                tracing::error!(error = ?err, model = self.model.as_str(), "Chat request failed");
                return CHAT_APOLOGY.to_string();
            }
        }
    }
}
