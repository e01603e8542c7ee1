use std::sync::Arc;
use std::time::Duration;

use orator::application::ports::{TranscriptionEngine, TranscriptionError};
use orator::infrastructure::audio::{RetryingTranscriptionEngine, SelfHostedEngine};

use crate::helpers::{EngineBehavior, StubEngine, canonical_audio, start_recording_server};

fn self_hosted(base_url: &str) -> Arc<dyn TranscriptionEngine> {
    Arc::new(SelfHostedEngine::new(base_url, Duration::from_secs(5)))
}

#[tokio::test]
async fn given_transient_failures_when_transcribing_then_retries_until_success() {
    let (base_url, shutdown_tx, captured) =
        start_recording_server(200, r#"{"text":"ok"}"#, vec![503, 429]).await;
    let engine =
        RetryingTranscriptionEngine::new(self_hosted(&base_url), 2, Duration::from_millis(10));

    let transcript = engine.transcribe(&canonical_audio(1), &[]).await.unwrap();

    assert_eq!(transcript.as_str(), "ok");
    assert_eq!(captured.lock().unwrap().len(), 3);
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_persistent_failures_when_transcribing_then_gives_up_after_max_retries() {
    let (base_url, shutdown_tx, captured) =
        start_recording_server(502, r#"{"error":"bad gateway"}"#, vec![]).await;
    let engine =
        RetryingTranscriptionEngine::new(self_hosted(&base_url), 2, Duration::from_millis(10));

    let result = engine.transcribe(&canonical_audio(1), &[]).await;

    assert!(matches!(
        result,
        Err(TranscriptionError::UnexpectedStatus { status: 502, .. })
    ));
    assert_eq!(captured.lock().unwrap().len(), 3);
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_client_error_when_transcribing_then_does_not_retry() {
    let inner = Arc::new(StubEngine::new(EngineBehavior::Status(400)));
    let engine = RetryingTranscriptionEngine::new(inner.clone(), 3, Duration::from_millis(10));

    let result = engine.transcribe(&canonical_audio(1), &[]).await;

    assert!(result.is_err());
    assert_eq!(inner.calls(), 1);
}
