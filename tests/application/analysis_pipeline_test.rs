use std::sync::Arc;

use orator::application::ports::TranscriptionError;
use orator::application::services::{AnalysisError, InputRejection, PipelineConfig, PipelineStage};
use orator::domain::{AudioBlob, Feedback};

use crate::helpers::{
    EngineBehavior, LlmBehavior, StubEngine, StubLlm, StubNormalizer, build_pipeline,
    canonical_wav_blob, test_config,
};

#[tokio::test]
async fn given_valid_recording_when_analyzing_then_returns_transcript_metrics_and_scores() {
    let normalizer = Arc::new(StubNormalizer::ok(6));
    let engine = Arc::new(StubEngine::text("um this is um a test like you know"));
    let llm = Arc::new(StubLlm::scored());
    let pipeline = build_pipeline(&normalizer, &engine, Some(&llm), test_config());

    let result = pipeline.analyze(canonical_wav_blob(0.5)).await.unwrap();

    assert_eq!(result.transcript.as_str(), "um this is um a test like you know");
    assert_eq!(result.metrics.word_count, 9);
    assert_eq!(result.metrics.filler_count, 4);
    assert_eq!(result.metrics.words_per_minute, 90.0);
    assert!(matches!(result.feedback, Feedback::Scored(_)));
    assert_eq!(
        (normalizer.calls(), engine.calls(), llm.calls()),
        (1, 1, 1)
    );
}

#[tokio::test]
async fn given_empty_upload_when_analyzing_then_rejects_without_calling_providers() {
    let normalizer = Arc::new(StubNormalizer::ok(1));
    let engine = Arc::new(StubEngine::text("unused"));
    let llm = Arc::new(StubLlm::scored());
    let pipeline = build_pipeline(&normalizer, &engine, Some(&llm), test_config());

    let result = pipeline.analyze(AudioBlob::new(Vec::new(), None, None)).await;

    let error = result.unwrap_err();
    assert!(matches!(
        error,
        AnalysisError::InputRejected(InputRejection::EmptyAudio)
    ));
    assert_eq!(error.stage(), PipelineStage::Received);
    assert_eq!(
        (normalizer.calls(), engine.calls(), llm.calls()),
        (0, 0, 0)
    );
}

#[tokio::test]
async fn given_oversized_upload_when_analyzing_then_rejects_as_too_large() {
    let normalizer = Arc::new(StubNormalizer::ok(1));
    let engine = Arc::new(StubEngine::text("unused"));
    let config = PipelineConfig {
        max_upload_bytes: 100,
        ..test_config()
    };
    let pipeline = build_pipeline(&normalizer, &engine, None, config);

    let result = pipeline.analyze(canonical_wav_blob(0.1)).await;

    assert!(matches!(
        result,
        Err(AnalysisError::InputRejected(InputRejection::TooLarge { limit: 100, .. }))
    ));
    assert_eq!(normalizer.calls(), 0);
}

#[tokio::test]
async fn given_undecodable_audio_when_analyzing_then_fails_in_normalizing_stage() {
    let normalizer = Arc::new(StubNormalizer::failing());
    let engine = Arc::new(StubEngine::text("unused"));
    let pipeline = build_pipeline(&normalizer, &engine, None, test_config());

    let error = pipeline.analyze(canonical_wav_blob(0.1)).await.unwrap_err();

    assert!(matches!(error, AnalysisError::Conversion(_)));
    assert_eq!(error.stage(), PipelineStage::Normalizing);
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn given_provider_error_when_analyzing_then_fails_in_transcribing_stage() {
    let normalizer = Arc::new(StubNormalizer::ok(1));
    let engine = Arc::new(StubEngine::new(EngineBehavior::Status(503)));
    let llm = Arc::new(StubLlm::scored());
    let pipeline = build_pipeline(&normalizer, &engine, Some(&llm), test_config());

    let error = pipeline.analyze(canonical_wav_blob(0.1)).await.unwrap_err();

    assert!(matches!(
        error,
        AnalysisError::Transcription(TranscriptionError::UnexpectedStatus { status: 503, .. })
    ));
    assert_eq!(error.stage(), PipelineStage::Transcribing);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn given_no_recognized_speech_when_analyzing_then_succeeds_with_empty_text() {
    let normalizer = Arc::new(StubNormalizer::ok(2));
    let engine = Arc::new(StubEngine::text(""));
    let llm = Arc::new(StubLlm::scored());
    let pipeline = build_pipeline(&normalizer, &engine, Some(&llm), test_config());

    let result = pipeline.analyze(canonical_wav_blob(0.1)).await.unwrap();

    assert!(result.transcript.is_empty());
    assert_eq!(result.metrics.word_count, 0);
    assert!(!result.feedback.is_available());
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn given_hanging_feedback_service_when_analyzing_then_degrades_after_timeout() {
    let normalizer = Arc::new(StubNormalizer::ok(4));
    let engine = Arc::new(StubEngine::text("I shipped the feature on time"));
    let llm = Arc::new(StubLlm::new(LlmBehavior::Hang));
    let pipeline = build_pipeline(&normalizer, &engine, Some(&llm), test_config());

    let result = pipeline.analyze(canonical_wav_blob(0.1)).await.unwrap();

    assert_eq!(result.transcript.as_str(), "I shipped the feature on time");
    assert_eq!(result.metrics.word_count, 6);
    assert!(matches!(result.feedback, Feedback::Unavailable { .. }));
}

#[tokio::test]
async fn given_failing_feedback_service_when_analyzing_then_still_succeeds() {
    let normalizer = Arc::new(StubNormalizer::ok(4));
    let engine = Arc::new(StubEngine::text("answer"));
    let llm = Arc::new(StubLlm::new(LlmBehavior::Fail));
    let pipeline = build_pipeline(&normalizer, &engine, Some(&llm), test_config());

    let result = pipeline.analyze(canonical_wav_blob(0.1)).await.unwrap();

    assert!(!result.feedback.is_available());
    assert_eq!(llm.calls(), 1);
}

#[tokio::test]
async fn given_no_feedback_service_when_analyzing_then_reports_unavailable() {
    let normalizer = Arc::new(StubNormalizer::ok(4));
    let engine = Arc::new(StubEngine::text("answer"));
    let pipeline = build_pipeline(&normalizer, &engine, None, test_config());

    let result = pipeline.analyze(canonical_wav_blob(0.1)).await.unwrap();

    assert_eq!(
        result.feedback,
        Feedback::unavailable("feedback service not configured")
    );
}

#[tokio::test]
async fn given_two_engines_with_same_transcript_when_analyzing_then_outputs_match() {
    let text = "ну я как бы справился с задачей";
    let llm = Arc::new(StubLlm::scored());
    let first = build_pipeline(
        &Arc::new(StubNormalizer::ok(5)),
        &Arc::new(StubEngine::text(text)),
        Some(&llm),
        test_config(),
    );
    let second = build_pipeline(
        &Arc::new(StubNormalizer::ok(5)),
        &Arc::new(StubEngine::text(text)),
        Some(&llm),
        test_config(),
    );

    let a = first.analyze(canonical_wav_blob(0.1)).await.unwrap();
    let b = second.analyze(canonical_wav_blob(0.1)).await.unwrap();

    assert_eq!(a.transcript, b.transcript);
    assert_eq!(a.metrics, b.metrics);
    assert_eq!(a.feedback, b.feedback);
    assert_ne!(a.run_id, b.run_id);
}
