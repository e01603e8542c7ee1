use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::AudioNormalizer;
use crate::presentation::config::{AudioSettings, NormalizerProviderSetting};

use super::ffmpeg_normalizer::{FfmpegAudioNormalizer, check_ffmpeg_binary};
use super::symphonia_normalizer::SymphoniaAudioNormalizer;

pub struct AudioNormalizerFactory;

impl AudioNormalizerFactory {
    pub fn create(settings: &AudioSettings) -> Arc<dyn AudioNormalizer> {
        match settings.normalizer {
            NormalizerProviderSetting::Ffmpeg => {
                let ffmpeg_path = PathBuf::from(&settings.ffmpeg_path);
                match check_ffmpeg_binary(&ffmpeg_path) {
                    Ok(version) => tracing::info!(%version, "Using ffmpeg audio normalizer"),
                    Err(e) => tracing::warn!(
                        error = %e,
                        "ffmpeg not usable, conversions of non-canonical audio will fail"
                    ),
                }
                let temp_dir = settings.temp_dir.as_ref().map(PathBuf::from);
                Arc::new(
                    FfmpegAudioNormalizer::new(ffmpeg_path, temp_dir)
                        .with_timeout(Duration::from_secs(settings.timeout_secs)),
                )
            }
            NormalizerProviderSetting::Native => {
                tracing::info!("Using in-process audio normalizer");
                Arc::new(SymphoniaAudioNormalizer)
            }
        }
    }
}
