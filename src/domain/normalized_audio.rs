use std::time::Duration;

use bytes::Bytes;

pub const CANONICAL_SAMPLE_RATE: u32 = 16_000;
pub const CANONICAL_BIT_DEPTH: u16 = 16;
pub const CANONICAL_CHANNELS: u16 = 1;

/// Mono 16-bit little-endian PCM at 16 kHz, framed as a WAV file.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAudio {
    pub data: Bytes,
    pub sample_rate: u32,
    pub bit_depth: u16,
    pub channels: u16,
    pub frames: u32,
}

impl NormalizedAudio {
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames as f64 / self.sample_rate as f64)
    }

    pub fn is_canonical(&self) -> bool {
        self.sample_rate == CANONICAL_SAMPLE_RATE
            && self.bit_depth == CANONICAL_BIT_DEPTH
            && self.channels == CANONICAL_CHANNELS
    }
}
