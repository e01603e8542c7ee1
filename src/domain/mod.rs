mod analysis_result;
mod audio_blob;
mod normalized_audio;
mod rubric;
mod run_id;
mod speech_metrics;
mod transcript;

pub use analysis_result::AnalysisResult;
pub use audio_blob::{AudioBlob, AudioContainer};
pub use normalized_audio::{
    CANONICAL_BIT_DEPTH, CANONICAL_CHANNELS, CANONICAL_SAMPLE_RATE, NormalizedAudio,
};
pub use rubric::{CriterionScore, Feedback, MAX_SCORE, MIN_SCORE, RubricCriterion, RubricScore};
pub use run_id::RunId;
pub use speech_metrics::SpeechMetrics;
pub use transcript::Transcript;
