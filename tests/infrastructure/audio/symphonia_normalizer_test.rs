use std::io::Cursor;

use orator::application::ports::{AudioNormalizer, ConversionError};
use orator::domain::{AudioBlob, NormalizedAudio, RunId};
use orator::infrastructure::audio::SymphoniaAudioNormalizer;

use crate::helpers::{build_wav, canonical_wav_blob, tone};

fn wav_blob(sample_rate: u32, seconds: f32) -> AudioBlob {
    AudioBlob::new(
        build_wav(sample_rate, 1, &tone(sample_rate, seconds)),
        Some("audio/wav".to_string()),
        None,
    )
}

fn pcm(audio: &NormalizedAudio) -> Vec<i16> {
    hound::WavReader::new(Cursor::new(audio.data.as_ref()))
        .unwrap()
        .into_samples::<i16>()
        .map(Result::unwrap)
        .collect()
}

fn peak(samples: &[i16]) -> i32 {
    samples.iter().map(|&s| (s as i32).abs()).max().unwrap_or(0)
}

#[test]
fn given_canonical_wav_when_normalizing_natively_then_returns_input_unchanged() {
    let blob = canonical_wav_blob(0.3);

    let audio = SymphoniaAudioNormalizer.normalize(&blob, RunId::new()).unwrap();

    assert_eq!(audio.data, blob.data);
}

#[test]
fn given_48khz_wav_when_normalizing_natively_then_resamples_to_exact_length() {
    let audio = SymphoniaAudioNormalizer
        .normalize(&wav_blob(48_000, 1.0), RunId::new())
        .unwrap();

    assert!(audio.is_canonical());
    assert_eq!(audio.frames, 16_000);
}

#[test]
fn given_resampled_tone_when_normalizing_natively_then_signal_starts_without_delay() {
    let audio = SymphoniaAudioNormalizer
        .normalize(&wav_blob(48_000, 1.0), RunId::new())
        .unwrap();

    let samples = pcm(&audio);

    // One 440 Hz period is about 36 samples at 16 kHz.
    assert!(peak(&samples[..32]) > 4_000, "head peak {}", peak(&samples[..32]));
    let tail = &samples[samples.len() - 32..];
    assert!(peak(tail) > 2_000, "tail peak {}", peak(tail));
}

#[test]
fn given_long_44khz_recording_when_normalizing_natively_then_length_follows_rate_ratio() {
    let audio = SymphoniaAudioNormalizer
        .normalize(&wav_blob(44_100, 2.5), RunId::new())
        .unwrap();

    assert_eq!(audio.frames, 40_000);
    assert_eq!(pcm(&audio).len(), 40_000);
}

#[test]
fn given_stereo_wav_when_normalizing_natively_then_downmixes_to_mono() {
    let samples: Vec<i16> = tone(16_000, 0.5)
        .into_iter()
        .flat_map(|s| [s, s])
        .collect();
    let blob = AudioBlob::new(build_wav(16_000, 2, &samples), None, Some("a.wav".into()));

    let audio = SymphoniaAudioNormalizer.normalize(&blob, RunId::new()).unwrap();

    assert_eq!(audio.channels, 1);
    assert_eq!(audio.frames, 8_000);
}

#[test]
fn given_garbage_bytes_when_normalizing_natively_then_reports_decoding_failure() {
    let blob = AudioBlob::new(b"not audio at all".to_vec(), None, None);

    let result = SymphoniaAudioNormalizer.normalize(&blob, RunId::new());

    assert!(matches!(result, Err(ConversionError::DecodingFailed(_))));
}
