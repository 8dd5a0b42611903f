mod wav;

pub use wav::*;
