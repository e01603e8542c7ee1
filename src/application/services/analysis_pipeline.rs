use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::Instrument;

use crate::application::ports::{
    AudioNormalizer, ConversionError, LlmClient, TranscriptionEngine, TranscriptionError,
};
use crate::domain::{
    AnalysisResult, AudioBlob, Feedback, NormalizedAudio, RubricCriterion, RunId, Transcript,
};

use super::feedback_composer::{FeedbackComposer, FeedbackError};
use super::metric_extractor::extract_metrics;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub language_hints: Vec<String>,
    pub rubric: Vec<RubricCriterion>,
    pub max_upload_bytes: u64,
    pub conversion_timeout: Duration,
    pub transcription_timeout: Duration,
    pub feedback_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            language_hints: vec![
                "kk-KZ".to_string(),
                "ru-RU".to_string(),
                "en-US".to_string(),
            ],
            rubric: RubricCriterion::ALL.to_vec(),
            max_upload_bytes: 30 * 1024 * 1024,
            conversion_timeout: Duration::from_secs(60),
            transcription_timeout: Duration::from_secs(60),
            feedback_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Received,
    Normalizing,
    Transcribing,
    Scoring,
    Composing,
    Done,
    Errored,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Received => "received",
            PipelineStage::Normalizing => "normalizing",
            PipelineStage::Transcribing => "transcribing",
            PipelineStage::Scoring => "scoring",
            PipelineStage::Composing => "composing",
            PipelineStage::Done => "done",
            PipelineStage::Errored => "errored",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InputRejection {
    #[error("audio missing")]
    MissingAudio,
    #[error("audio is empty")]
    EmptyAudio,
    #[error("audio is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
    #[error("upload unreadable: {0}")]
    Unreadable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("input rejected: {0}")]
    InputRejected(#[from] InputRejection),
    #[error("conversion failed: {0}")]
    Conversion(#[from] ConversionError),
    #[error("transcription failed: {0}")]
    Transcription(#[from] TranscriptionError),
    #[error("unexpected error while {stage}: {detail}")]
    Unexpected {
        stage: PipelineStage,
        detail: String,
    },
}

impl AnalysisError {
    /// The stage the run was in when it failed.
    pub fn stage(&self) -> PipelineStage {
        match self {
            AnalysisError::InputRejected(_) => PipelineStage::Received,
            AnalysisError::Conversion(_) => PipelineStage::Normalizing,
            AnalysisError::Transcription(_) => PipelineStage::Transcribing,
            AnalysisError::Unexpected { stage, .. } => *stage,
        }
    }
}

/// Runs one recording through normalization, transcription, metric
/// extraction and feedback composition.
///
/// Holds only read-only collaborators, so one instance serves concurrent runs.
pub struct AnalysisPipeline<L>
where
    L: LlmClient,
{
    normalizer: Arc<dyn AudioNormalizer>,
    transcription_engine: Arc<dyn TranscriptionEngine>,
    feedback_composer: Option<FeedbackComposer<L>>,
    config: PipelineConfig,
}

impl<L> AnalysisPipeline<L>
where
    L: LlmClient + 'static,
{
    pub fn new(
        normalizer: Arc<dyn AudioNormalizer>,
        transcription_engine: Arc<dyn TranscriptionEngine>,
        feedback_composer: Option<FeedbackComposer<L>>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            normalizer,
            transcription_engine,
            feedback_composer,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn analyze(&self, blob: AudioBlob) -> Result<AnalysisResult, AnalysisError> {
        let run_id = RunId::new();
        let span = tracing::info_span!("analysis_run", run_id = %run_id);
        self.run(run_id, blob).instrument(span).await
    }

    async fn run(&self, run_id: RunId, blob: AudioBlob) -> Result<AnalysisResult, AnalysisError> {
        let started = Instant::now();
        let mut tracker = StageTracker::new();

        tracing::info!(
            bytes = blob.size_bytes(),
            container = ?blob.container(),
            "Analysis run received"
        );

        self.validate(&blob).map_err(|e| tracker.fail(e.into()))?;

        tracker.enter(PipelineStage::Normalizing);
        let audio = self
            .normalize(blob, run_id)
            .await
            .map_err(|e| tracker.fail(e))?;

        tracker.enter(PipelineStage::Transcribing);
        let transcript = self
            .transcribe(&audio)
            .await
            .map_err(|e| tracker.fail(e.into()))?;

        tracker.enter(PipelineStage::Scoring);
        let metrics = extract_metrics(&transcript, Some(audio.duration()));
        drop(audio);

        tracker.enter(PipelineStage::Composing);
        let feedback = self.compose(&transcript).await;

        tracker.enter(PipelineStage::Done);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            words = metrics.word_count,
            fillers = metrics.filler_count,
            wpm = metrics.words_per_minute,
            feedback_available = feedback.is_available(),
            elapsed_ms,
            "Analysis run completed"
        );

        Ok(AnalysisResult {
            run_id,
            transcript,
            metrics,
            feedback,
            elapsed_ms,
        })
    }

    fn validate(&self, blob: &AudioBlob) -> Result<(), InputRejection> {
        if blob.is_empty() {
            return Err(InputRejection::EmptyAudio);
        }
        if blob.size_bytes() > self.config.max_upload_bytes {
            return Err(InputRejection::TooLarge {
                size: blob.size_bytes(),
                limit: self.config.max_upload_bytes,
            });
        }
        Ok(())
    }

    async fn normalize(
        &self,
        blob: AudioBlob,
        run_id: RunId,
    ) -> Result<NormalizedAudio, AnalysisError> {
        let normalizer = Arc::clone(&self.normalizer);
        let timeout = self.config.conversion_timeout;

        let task = tokio::task::spawn_blocking(move || normalizer.normalize(&blob, run_id));

        match tokio::time::timeout(timeout, task).await {
            Err(_) => Err(ConversionError::TimedOut(timeout.as_secs()).into()),
            Ok(Err(join_error)) => Err(AnalysisError::Unexpected {
                stage: PipelineStage::Normalizing,
                detail: format!("normalizer task failed: {}", join_error),
            }),
            Ok(Ok(result)) => {
                let audio = result?;
                tracing::debug!(
                    bytes = audio.data.len(),
                    duration_secs = audio.duration().as_secs_f32(),
                    "Audio normalized"
                );
                Ok(audio)
            }
        }
    }

    async fn transcribe(&self, audio: &NormalizedAudio) -> Result<Transcript, TranscriptionError> {
        let timeout = self.config.transcription_timeout;

        let transcript = tokio::time::timeout(
            timeout,
            self.transcription_engine
                .transcribe(audio, &self.config.language_hints),
        )
        .await
        .map_err(|_| TranscriptionError::TimedOut(timeout.as_secs()))??;

        tracing::debug!(chars = transcript.as_str().len(), "Audio transcribed");
        Ok(transcript)
    }

    async fn compose(&self, transcript: &Transcript) -> Feedback {
        let Some(composer) = &self.feedback_composer else {
            return Feedback::unavailable("feedback service not configured");
        };

        let timeout = self.config.feedback_timeout;
        let result =
            tokio::time::timeout(timeout, composer.compose(transcript, &self.config.rubric))
                .await
                .unwrap_or(Err(FeedbackError::TimedOut(timeout.as_secs())));

        result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Feedback degraded");
            Feedback::unavailable(e.to_string())
        })
    }
}

struct StageTracker {
    stage: PipelineStage,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            stage: PipelineStage::Received,
        }
    }

    fn enter(&mut self, next: PipelineStage) {
        tracing::debug!(from = %self.stage, to = %next, "Pipeline stage transition");
        self.stage = next;
    }

    fn fail(&mut self, error: AnalysisError) -> AnalysisError {
        tracing::error!(stage = %self.stage, error = %error, "Analysis run failed");
        self.stage = PipelineStage::Errored;
        error
    }
}
