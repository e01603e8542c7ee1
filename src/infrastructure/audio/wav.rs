use std::io::Cursor;

use bytes::Bytes;
use hound::{SampleFormat, WavReader, WavSpec};

use crate::application::ports::ConversionError;
use crate::domain::{
    AudioBlob, AudioContainer, CANONICAL_BIT_DEPTH, CANONICAL_CHANNELS, CANONICAL_SAMPLE_RATE,
    NormalizedAudio,
};

pub fn canonical_spec() -> WavSpec {
    WavSpec {
        channels: CANONICAL_CHANNELS,
        sample_rate: CANONICAL_SAMPLE_RATE,
        bits_per_sample: CANONICAL_BIT_DEPTH,
        sample_format: SampleFormat::Int,
    }
}

pub fn is_canonical(spec: &WavSpec) -> bool {
    *spec == canonical_spec()
}

/// Returns the blob untouched when it is declared (or sniffed) as WAV and its
/// header already describes canonical PCM.
pub fn passthrough(blob: &AudioBlob) -> Option<NormalizedAudio> {
    let declared_wav = match blob.container() {
        AudioContainer::Wav => true,
        AudioContainer::Unknown => has_wav_magic(&blob.data),
        _ => false,
    };
    if !declared_wav {
        return None;
    }

    read_canonical(blob.data.clone()).ok()
}

/// Wraps WAV bytes as [`NormalizedAudio`] without copying them.
pub fn read_canonical(data: Bytes) -> Result<NormalizedAudio, ConversionError> {
    let reader = WavReader::new(Cursor::new(data.as_ref()))
        .map_err(|e| ConversionError::DecodingFailed(format!("wav header: {}", e)))?;
    let spec = reader.spec();

    if !is_canonical(&spec) {
        return Err(ConversionError::NonCanonicalOutput(format!(
            "{} ch, {} Hz, {} bit {:?}",
            spec.channels, spec.sample_rate, spec.bits_per_sample, spec.sample_format
        )));
    }

    let frames = reader.duration();
    Ok(NormalizedAudio {
        data,
        sample_rate: spec.sample_rate,
        bit_depth: spec.bits_per_sample,
        channels: spec.channels,
        frames,
    })
}

/// Converts a sample in [-1.0, 1.0] to 16-bit PCM, clamping out-of-range input.
pub fn pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

fn has_wav_magic(data: &[u8]) -> bool {
    data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WAVE"
}
