use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;

use orator::application::services::{AnalysisPipeline, FeedbackComposer, PipelineConfig};
use orator::infrastructure::audio::{AudioNormalizerFactory, TranscriptionEngineFactory};
use orator::infrastructure::credentials::bootstrap_cloud_credential;
use orator::infrastructure::llm::OpenAiClient;
use orator::infrastructure::observability::{TracingConfig, init_tracing};
use orator::presentation::config::TranscriptionProviderSetting;
use orator::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(
        TracingConfig::from_settings(environment, &settings.logging),
        settings.server.port,
    );

    let normalizer = AudioNormalizerFactory::create(&settings.audio);

    let credential = match settings.transcription.provider {
        TranscriptionProviderSetting::Cloud => Some(
            bootstrap_cloud_credential(&settings.transcription.cloud)
                .context("Cloud speech credential bootstrap failed")?,
        ),
        TranscriptionProviderSetting::SelfHosted => None,
    };

    let transcription_engine =
        TranscriptionEngineFactory::create(&settings.transcription, credential)
            .context("Failed to create transcription engine")?;

    let feedback_composer = if settings.feedback.is_active() {
        tracing::info!(model = %settings.feedback.model, "Rubric feedback enabled");
        Some(FeedbackComposer::new(Arc::new(OpenAiClient::from_settings(
            &settings.feedback,
        ))))
    } else {
        tracing::warn!("Rubric feedback disabled, responses will carry unavailable feedback");
        None
    };

    let pipeline_config = PipelineConfig {
        language_hints: settings.transcription.language_codes.clone(),
        rubric: settings.feedback.rubric.clone(),
        max_upload_bytes: settings.upload.max_bytes(),
        conversion_timeout: Duration::from_secs(settings.audio.timeout_secs),
        transcription_timeout: Duration::from_secs(settings.transcription.timeout_secs),
        feedback_timeout: Duration::from_secs(settings.feedback.timeout_secs),
    };

    let pipeline = Arc::new(AnalysisPipeline::new(
        normalizer,
        transcription_engine,
        feedback_composer,
        pipeline_config,
    ));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;

    let router = create_router(AppState { pipeline, settings });

    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
