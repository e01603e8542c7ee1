use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::LlmClient;
use crate::application::services::{AnalysisError, InputRejection, PipelineStage};
use crate::domain::{AnalysisResult, AudioBlob, Feedback, SpeechMetrics};
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

const AUDIO_FIELD: &str = "audio";

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub text: String,
    pub metrics: SpeechMetrics,
    pub feedback: Feedback,
    pub took_ms: u64,
    pub run_id: String,
}

impl From<AnalysisResult> for AnalyzeResponse {
    fn from(result: AnalysisResult) -> Self {
        Self {
            text: result.transcript.as_str().to_string(),
            metrics: result.metrics,
            feedback: result.feedback,
            took_ms: result.elapsed_ms,
            run_id: result.run_id.to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub stage: PipelineStage,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub ok: bool,
    pub endpoint: &'static str,
}

pub async fn analyze_info_handler() -> impl IntoResponse {
    Json(EndpointInfo {
        ok: true,
        endpoint: "POST /api/analyze",
    })
}

#[tracing::instrument(skip(state, multipart))]
pub async fn analyze_handler<L>(
    State(state): State<AppState<L>>,
    mut multipart: Multipart,
) -> Response
where
    L: LlmClient + 'static,
{
    let blob = match read_audio_part(&mut multipart).await {
        Ok(Some(blob)) => blob,
        Ok(None) => {
            tracing::warn!("Analyze request without an audio part");
            return error_response(&InputRejection::MissingAudio.into());
        }
        Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            tracing::warn!(error = %e, "Upload exceeds body limit");
            let limit = state.pipeline.config().max_upload_bytes;
            return error_response(
                &InputRejection::TooLarge {
                    size: limit.saturating_add(1),
                    limit,
                }
                .into(),
            );
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read multipart");
            return error_response(&InputRejection::Unreadable(e.body_text()).into());
        }
    };

    tracing::debug!(
        bytes = blob.size_bytes(),
        content_type = ?blob.content_type,
        filename = ?blob.filename,
        "Audio part received"
    );

    match state.pipeline.analyze(blob).await {
        Ok(result) => {
            tracing::info!(
                run_id = %result.run_id,
                transcript = %sanitize_prompt(result.transcript.as_str()),
                "Analysis succeeded"
            );
            (StatusCode::OK, Json(AnalyzeResponse::from(result))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Picks the field named `audio`, or else the first field carrying a file name.
async fn read_audio_part(multipart: &mut Multipart) -> Result<Option<AudioBlob>, MultipartError> {
    let mut fallback = None;

    while let Some(field) = multipart.next_field().await? {
        let named_audio = field.name() == Some(AUDIO_FIELD);
        if !named_audio && (fallback.is_some() || field.file_name().is_none()) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let filename = field.file_name().map(str::to_string);
        let data = field.bytes().await?;
        let blob = AudioBlob::new(data, content_type, filename);

        if named_audio {
            return Ok(Some(blob));
        }
        fallback = Some(blob);
    }

    Ok(fallback)
}

fn error_response(error: &AnalysisError) -> Response {
    let (status, kind, detail) = match error {
        AnalysisError::InputRejected(rejection @ InputRejection::TooLarge { .. }) => (
            StatusCode::PAYLOAD_TOO_LARGE,
            "input_rejected",
            rejection.to_string(),
        ),
        AnalysisError::InputRejected(rejection) => {
            (StatusCode::BAD_REQUEST, "input_rejected", rejection.to_string())
        }
        AnalysisError::Conversion(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "conversion_failed",
            e.to_string(),
        ),
        AnalysisError::Transcription(e) => {
            (StatusCode::BAD_GATEWAY, "transcription_failed", e.to_string())
        }
        AnalysisError::Unexpected { detail, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "unexpected_error",
            detail.clone(),
        ),
    };

    (
        status,
        Json(ErrorResponse {
            error: kind,
            detail: Some(detail),
            stage: error.stage(),
        }),
    )
        .into_response()
}
