use async_trait::async_trait;

use crate::domain::{NormalizedAudio, Transcript};

#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    /// `language_hints` is ordered: the first entry is the primary language.
    async fn transcribe(
        &self,
        audio: &NormalizedAudio,
        language_hints: &[String],
    ) -> Result<Transcript, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("transcription timed out after {0} s")]
    TimedOut(u64),
    #[error("engine misconfigured: {0}")]
    Misconfigured(String),
}

impl TranscriptionError {
    /// Network failures, timeouts, throttling and server errors may succeed on
    /// a later attempt; everything else will not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ApiRequestFailed(_) | Self::TimedOut(_) => true,
            Self::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
