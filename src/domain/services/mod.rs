mod conversation_agent;
mod speech_synthesizer;
mod story_generator;
mod story_session;

pub use conversation_agent::*;
pub use speech_synthesizer::*;
pub use story_generator::*;
pub use story_session::*;
