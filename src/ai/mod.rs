mod client;
mod prompt;
mod supervisor;

pub use client::*;
pub use prompt::*;
pub use supervisor::*;
