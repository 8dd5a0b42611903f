pub mod audio;
pub mod backends;
