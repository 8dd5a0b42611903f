//! Fixed prompt text and user-facing fallbacks.

#[cfg(test)]
#[path = "prompts_test.rs"]
mod tests;

/// Instruction sent alongside the uploaded image.
pub const STORY_PROMPT: &str = "Look at this image and write the opening of a story inspired by it. Keep it to roughly 150 words. Make it atmospheric and evocative, focusing on sensory details: what can be seen, heard, smelled and felt. End on a note that invites the reader to continue.";

/// Returned when the generation endpoint answers without any text.
pub const STORY_FALLBACK: &str = "The image held its secrets close, and no story came forth.";

/// Shown in place of a story when generation fails outright.
pub const STORY_UNAVAILABLE: &str = "I was unable to read the stars for this image. Please try another one.";

/// System persona for the co-author chat.
pub const CHAT_PERSONA: &str = "You are a helpful, creative writing co-author. The user is working on a story that was inspired by an image. Answer their questions about the story, suggest directions it could take, and help develop its characters and world. Be concise but inspiring.";

/// Reply shown when a chat turn fails for any reason.
pub const CHAT_APOLOGY: &str = "I'm sorry, I lost my train of thought for a moment. Could you ask me that again?";

/// Wraps the first question of a conversation with the story it is about.
pub fn grounded_question(story: &str, question: &str) -> String {
    return format!("Context: The story so far is: \"{story}\". \n\n User Question: {question}");
}
