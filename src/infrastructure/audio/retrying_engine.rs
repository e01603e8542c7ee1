use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::domain::{NormalizedAudio, Transcript};

/// Retries transient failures of the wrapped engine with linear backoff.
pub struct RetryingTranscriptionEngine {
    inner: Arc<dyn TranscriptionEngine>,
    max_retries: u32,
    backoff: Duration,
}

impl RetryingTranscriptionEngine {
    pub fn new(inner: Arc<dyn TranscriptionEngine>, max_retries: u32, backoff: Duration) -> Self {
        Self {
            inner,
            max_retries,
            backoff,
        }
    }
}

#[async_trait]
impl TranscriptionEngine for RetryingTranscriptionEngine {
    async fn transcribe(
        &self,
        audio: &NormalizedAudio,
        language_hints: &[String],
    ) -> Result<Transcript, TranscriptionError> {
        let mut attempt = 0;
        loop {
            match self.inner.transcribe(audio, language_hints).await {
                Ok(transcript) => return Ok(transcript),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.backoff * attempt;
                    tracing::warn!(
                        error = %e,
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Transient transcription failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
