use super::rubric::Feedback;
use super::run_id::RunId;
use super::speech_metrics::SpeechMetrics;
use super::transcript::Transcript;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub run_id: RunId,
    pub transcript: Transcript,
    pub metrics: SpeechMetrics,
    pub feedback: Feedback,
    pub elapsed_ms: u64,
}
