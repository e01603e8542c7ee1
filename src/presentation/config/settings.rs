use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File};
use serde::Deserialize;

use crate::domain::RubricCriterion;

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub upload: UploadSettings,
    pub audio: AudioSettings,
    pub transcription: TranscriptionSettings,
    pub feedback: FeedbackSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    pub max_file_size_mb: u64,
}

impl UploadSettings {
    pub fn max_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioSettings {
    pub normalizer: NormalizerProviderSetting,
    pub ffmpeg_path: String,
    pub temp_dir: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizerProviderSetting {
    Ffmpeg,
    #[serde(alias = "symphonia")]
    Native,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionSettings {
    pub provider: TranscriptionProviderSetting,
    pub language_codes: Vec<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub cloud: CloudSpeechSettings,
    pub self_hosted: SelfHostedSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptionProviderSetting {
    #[serde(alias = "google")]
    Cloud,
    #[serde(alias = "vosk", alias = "selfhosted")]
    SelfHosted,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudSpeechSettings {
    pub base_url: String,
    pub api_version: String,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    /// Base64-encoded API key, as injected by hosting platforms.
    pub encoded_key: Option<String>,
    pub enable_automatic_punctuation: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelfHostedSettings {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackSettings {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub rubric: Vec<RubricCriterion>,
}

impl FeedbackSettings {
    /// Feedback needs both the switch and a credential.
    pub fn is_active(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub enable_json: bool,
}

impl Settings {
    /// Defaults, then `config/base` and `config/<environment>` files, then
    /// `APP__SECTION__KEY` variables, then the legacy variable names.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let file_name = format!("config/{}", environment.as_str().to_lowercase());

        let builder = with_defaults(Config::builder())?
            .add_source(File::with_name("config/base").required(false))
            .add_source(File::with_name(&file_name).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("transcription.language_codes")
                    .with_list_parse_key("feedback.rubric")
                    .try_parsing(true),
            );

        with_legacy_overrides(builder, |key| std::env::var(key).ok())?
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only; no files, no environment.
    pub fn defaults() -> Result<Self, ConfigError> {
        with_defaults(Config::builder())?.build()?.try_deserialize()
    }

    /// Same as [`Settings::defaults`] with the legacy variables taken from
    /// `lookup` instead of the process environment.
    pub fn defaults_with_overrides<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        with_legacy_overrides(with_defaults(Config::builder())?, lookup)?
            .build()?
            .try_deserialize()
    }
}

fn with_defaults(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let rubric: Vec<&str> = RubricCriterion::ALL.iter().map(|c| c.as_str()).collect();

    builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("upload.max_file_size_mb", 30)?
        .set_default("audio.normalizer", "ffmpeg")?
        .set_default("audio.ffmpeg_path", "ffmpeg")?
        .set_default("audio.timeout_secs", 60)?
        .set_default("transcription.provider", "cloud")?
        .set_default("transcription.language_codes", vec!["kk-KZ", "ru-RU", "en-US"])?
        .set_default("transcription.timeout_secs", 60)?
        .set_default("transcription.max_retries", 0)?
        .set_default("transcription.retry_backoff_ms", 500)?
        .set_default("transcription.cloud.base_url", "https://speech.googleapis.com")?
        .set_default("transcription.cloud.api_version", "v1p1beta1")?
        .set_default("transcription.cloud.enable_automatic_punctuation", true)?
        .set_default("transcription.self_hosted.base_url", "http://vosk:2700")?
        .set_default("feedback.enabled", true)?
        .set_default("feedback.base_url", "https://api.openai.com/v1")?
        .set_default("feedback.model", "gpt-4o-mini")?
        .set_default("feedback.max_tokens", 400)?
        .set_default("feedback.temperature", 0.2)?
        .set_default("feedback.timeout_secs", 30)?
        .set_default("feedback.rubric", rubric)?
        .set_default("logging.level", "info")?
        .set_default("logging.enable_json", false)
}

/// Variable names the service has always honoured; they win over everything.
fn with_legacy_overrides<F>(
    builder: ConfigBuilder<DefaultState>,
    lookup: F,
) -> Result<ConfigBuilder<DefaultState>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let language_codes = lookup("LANGUAGE_CODE").map(|v| {
        v.split(',')
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .collect::<Vec<_>>()
    });

    builder
        .set_override_option("server.port", lookup("PORT"))?
        .set_override_option("transcription.provider", lookup("STT_PROVIDER"))?
        .set_override_option("transcription.language_codes", language_codes)?
        .set_override_option("transcription.cloud.api_key", lookup("GOOGLE_API_KEY"))?
        .set_override_option("transcription.cloud.encoded_key", lookup("GOOGLE_CLOUD_KEY"))?
        .set_override_option("transcription.self_hosted.base_url", lookup("VOSK_SERVER_URL"))?
        .set_override_option("feedback.api_key", lookup("OPENAI_API_KEY"))?
        .set_override_option("feedback.model", lookup("OPENAI_MODEL"))?
        .set_override_option(
            "logging.enable_json",
            lookup("LOG_FORMAT").map(|v| v.eq_ignore_ascii_case("json")),
        )
}
