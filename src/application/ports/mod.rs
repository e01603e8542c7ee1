mod audio_normalizer;
mod llm_client;
mod transcription_engine;

pub use audio_normalizer::{AudioNormalizer, ConversionError};
pub use llm_client::{LlmClient, LlmClientError};
pub use transcription_engine::{TranscriptionEngine, TranscriptionError};
