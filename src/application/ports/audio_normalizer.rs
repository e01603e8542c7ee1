use crate::domain::{AudioBlob, NormalizedAudio, RunId};

/// Turns an uploaded recording into canonical PCM. CPU-bound; callers run it
/// on the blocking pool.
pub trait AudioNormalizer: Send + Sync {
    fn normalize(
        &self,
        blob: &AudioBlob,
        run_id: RunId,
    ) -> Result<NormalizedAudio, ConversionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("audio decoding failed: {0}")]
    DecodingFailed(String),
    #[error("transcoder unavailable: {0}")]
    TranscoderUnavailable(String),
    #[error("transcoder failed: {0}")]
    TranscoderFailed(String),
    #[error("temporary file error: {0}")]
    TempFile(#[from] std::io::Error),
    #[error("output is not canonical pcm: {0}")]
    NonCanonicalOutput(String),
    #[error("conversion timed out after {0} s")]
    TimedOut(u64),
}
