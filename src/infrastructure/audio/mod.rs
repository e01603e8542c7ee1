mod cloud_speech_engine;
mod ffmpeg_normalizer;
mod normalizer_factory;
mod retrying_engine;
mod self_hosted_engine;
mod symphonia_normalizer;
mod transcription_engine_factory;
pub mod wav;

pub use cloud_speech_engine::CloudSpeechEngine;
pub use ffmpeg_normalizer::{FfmpegAudioNormalizer, check_ffmpeg_binary};
pub use normalizer_factory::AudioNormalizerFactory;
pub use retrying_engine::RetryingTranscriptionEngine;
pub use self_hosted_engine::SelfHostedEngine;
pub use symphonia_normalizer::SymphoniaAudioNormalizer;
pub use transcription_engine_factory::TranscriptionEngineFactory;
