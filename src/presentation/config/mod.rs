mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    AudioSettings, CloudSpeechSettings, FeedbackSettings, LoggingSettings,
    NormalizerProviderSetting, SelfHostedSettings, ServerSettings, Settings,
    TranscriptionProviderSetting, TranscriptionSettings, UploadSettings,
};
