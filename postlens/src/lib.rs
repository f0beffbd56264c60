// Library interface for postlens modules
// This allows tests and other binaries to import modules

pub mod analysis;
pub mod error;
pub mod extract;
pub mod llm;
pub mod oembed;
pub mod pipeline;
pub mod server;
pub mod sheets;
