use orator::domain::{NormalizedAudio, RunId, Transcript};

#[test]
fn given_padded_text_when_creating_transcript_then_trims() {
    let transcript = Transcript::new("  сәлем әлем \n");
    assert_eq!(transcript.as_str(), "сәлем әлем");
}

#[test]
fn given_whitespace_only_text_when_creating_transcript_then_is_empty() {
    assert!(Transcript::new("   ").is_empty());
    assert_eq!(Transcript::new(" "), Transcript::empty());
}

#[test]
fn given_two_run_ids_when_created_then_differ() {
    assert_ne!(RunId::new(), RunId::new());
}

#[test]
fn given_half_second_of_frames_when_computing_duration_then_returns_500ms() {
    let audio = NormalizedAudio {
        data: bytes::Bytes::new(),
        sample_rate: 16_000,
        bit_depth: 16,
        channels: 1,
        frames: 8_000,
    };

    assert_eq!(audio.duration().as_millis(), 500);
    assert!(audio.is_canonical());
}
