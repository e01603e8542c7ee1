use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use bytes::Bytes;
use tempfile::NamedTempFile;
use wait_timeout::ChildExt;

use crate::application::ports::{AudioNormalizer, ConversionError};
use crate::domain::{AudioBlob, CANONICAL_SAMPLE_RATE, NormalizedAudio, RunId};

use super::wav;

const STDERR_TAIL_CHARS: usize = 400;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Transcodes through an external `ffmpeg` binary. Handles the WebM/Opus
/// recordings browsers produce.
pub struct FfmpegAudioNormalizer {
    ffmpeg_path: PathBuf,
    temp_dir: Option<PathBuf>,
    timeout: Duration,
}

impl FfmpegAudioNormalizer {
    pub fn new(ffmpeg_path: impl Into<PathBuf>, temp_dir: Option<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            temp_dir,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// The child is killed once this elapses, so an abandoned run does not
    /// keep a blocking-pool thread busy.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Name carries the run id; `tempfile` adds a random suffix and removes
    /// the file on drop.
    fn temp_file(&self, run_id: RunId, role: &str, ext: &str) -> std::io::Result<NamedTempFile> {
        let prefix = format!("orator-{}-{}-", run_id, role);
        let suffix = format!(".{}", ext);

        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix).suffix(&suffix);

        match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
    }
}

impl Default for FfmpegAudioNormalizer {
    fn default() -> Self {
        Self::new("ffmpeg", None)
    }
}

impl AudioNormalizer for FfmpegAudioNormalizer {
    fn normalize(
        &self,
        blob: &AudioBlob,
        run_id: RunId,
    ) -> Result<NormalizedAudio, ConversionError> {
        if let Some(audio) = wav::passthrough(blob) {
            tracing::debug!("Audio already canonical, skipping ffmpeg");
            return Ok(audio);
        }

        let container = blob.container();
        let mut input = self.temp_file(run_id, "in", container.extension())?;
        input.write_all(&blob.data)?;
        input.flush()?;
        let output = self.temp_file(run_id, "out", "wav")?;

        tracing::debug!(
            container = ?container,
            input = %input.path().display(),
            "Transcoding audio with ffmpeg"
        );

        let stderr_log = self.temp_file(run_id, "stderr", "log")?;

        let mut child = Command::new(&self.ffmpeg_path)
            .args(["-hide_banner", "-loglevel", "error", "-nostdin", "-y", "-i"])
            .arg(input.path())
            .args(["-vn", "-map_metadata", "-1", "-fflags", "+bitexact"])
            .args(["-ac", "1", "-ar"])
            .arg(CANONICAL_SAMPLE_RATE.to_string())
            .args(["-c:a", "pcm_s16le", "-f", "wav"])
            .arg(output.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr_log.reopen()?))
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ConversionError::TranscoderUnavailable(format!(
                    "{} not found",
                    self.ffmpeg_path.display()
                )),
                _ => ConversionError::TranscoderFailed(format!("spawn: {}", e)),
            })?;

        let Some(status) = child.wait_timeout(self.timeout)? else {
            if let Err(e) = child.kill() {
                tracing::warn!(error = %e, "Failed to kill timed out ffmpeg");
            }
            child.wait()?;
            tracing::warn!(
                timeout_ms = self.timeout.as_millis() as u64,
                "ffmpeg killed after timeout"
            );
            return Err(ConversionError::TimedOut(self.timeout.as_secs()));
        };

        if !status.success() {
            let stderr = std::fs::read(stderr_log.path())?;
            return Err(ConversionError::TranscoderFailed(format!(
                "{}: {}",
                status,
                stderr_tail(&String::from_utf8_lossy(&stderr))
            )));
        }

        let data = std::fs::read(output.path())?;
        wav::read_canonical(Bytes::from(data))
    }
}

/// Runs `<ffmpeg> -version` and returns the first line of its output.
pub fn check_ffmpeg_binary(ffmpeg_path: &Path) -> Result<String, ConversionError> {
    let output = Command::new(ffmpeg_path)
        .arg("-version")
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            ConversionError::TranscoderUnavailable(format!("{}: {}", ffmpeg_path.display(), e))
        })?;

    if !output.status.success() {
        return Err(ConversionError::TranscoderUnavailable(format!(
            "{} -version exited with {}",
            ffmpeg_path.display(),
            output.status
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
}

fn stderr_tail(stderr: &str) -> String {
    let trimmed = stderr.trim();
    let count = trimmed.chars().count();
    if count <= STDERR_TAIL_CHARS {
        return trimmed.to_string();
    }
    trimmed.chars().skip(count - STDERR_TAIL_CHARS).collect()
}
