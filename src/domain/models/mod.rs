mod audio;
mod backend;
mod image;
mod message;
pub mod prompts;
mod role;
mod slash_commands;
mod story;

pub use audio::*;
pub use backend::*;
pub use image::*;
pub use message::*;
pub use role::*;
pub use slash_commands::*;
pub use story::*;
