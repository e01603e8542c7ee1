pub mod audio;
pub mod credentials;
pub mod llm;
pub mod observability;
