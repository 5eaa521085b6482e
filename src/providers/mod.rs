//! Generation plugin implementations

pub mod openai;

// Re-export for convenience
pub use openai::OpenAiPlugin;
