use std::time::Duration;

use crate::domain::{SpeechMetrics, Transcript};

const SINGLE_WORD_FILLERS: &[&str] = &[
    "ээ", "эээ", "мм", "ну", "типа", "ой", "ғой", "яғни", "uh", "um", "like",
];

const MULTI_WORD_FILLERS: &[&[&str]] = &[&["как", "бы"], &["you", "know"]];

/// Assumed speaking time when the recording length is not known.
pub const NOMINAL_DURATION: Duration = Duration::from_secs(60);
/// Shorter recordings do not yield a meaningful rate.
pub const MIN_RELIABLE_DURATION: Duration = Duration::from_secs(1);
pub const FALLBACK_MIN_WPM: f64 = 40.0;
pub const FALLBACK_MAX_WPM: f64 = 200.0;

pub const FAST_PACE_WPM: f64 = 170.0;
pub const SLOW_PACE_WPM: f64 = 100.0;
pub const MAX_FILLERS: usize = 3;

pub const TIP_SLOW_DOWN: &str = "Slow down a little; aim for 130-150 words per minute.";
pub const TIP_SPEED_UP: &str = "Pick up the pace a little; aim for 120-150 words per minute.";
pub const TIP_FEWER_FILLERS: &str =
    "Cut down on filler words such as \"um\", \"like\" or \"ээ\".";
pub const TIP_CHECK_MICROPHONE: &str =
    "No speech was detected; check your microphone or the recording format.";
pub const TIP_KEEP_GOING: &str = "Your pace and clarity are good, keep it up!";

struct TipRule {
    fires: fn(&SpeechMetrics) -> bool,
    tip: &'static str,
}

/// Evaluated in order; every rule that fires contributes its tip.
const TIP_RULES: [TipRule; 4] = [
    TipRule {
        fires: pace_too_fast,
        tip: TIP_SLOW_DOWN,
    },
    TipRule {
        fires: pace_too_slow,
        tip: TIP_SPEED_UP,
    },
    TipRule {
        fires: too_many_fillers,
        tip: TIP_FEWER_FILLERS,
    },
    TipRule {
        fires: no_speech,
        tip: TIP_CHECK_MICROPHONE,
    },
];

fn pace_too_fast(m: &SpeechMetrics) -> bool {
    m.word_count > 0 && m.words_per_minute > FAST_PACE_WPM
}

fn pace_too_slow(m: &SpeechMetrics) -> bool {
    m.word_count > 0 && m.words_per_minute < SLOW_PACE_WPM
}

fn too_many_fillers(m: &SpeechMetrics) -> bool {
    m.filler_count > MAX_FILLERS
}

fn no_speech(m: &SpeechMetrics) -> bool {
    m.word_count == 0
}

/// Computes pace and disfluency metrics for a transcript.
///
/// `elapsed` is the length of the recording. When it is missing or shorter
/// than [`MIN_RELIABLE_DURATION`] the rate is estimated against
/// [`NOMINAL_DURATION`] and clamped to
/// [`FALLBACK_MIN_WPM`]..=[`FALLBACK_MAX_WPM`].
pub fn extract_metrics(transcript: &Transcript, elapsed: Option<Duration>) -> SpeechMetrics {
    let tokens: Vec<String> = transcript
        .as_str()
        .split_whitespace()
        .map(normalize_token)
        .collect();

    let word_count = tokens.len();
    let filler_count = count_fillers(&tokens);
    let words_per_minute = words_per_minute(word_count, elapsed);

    let mut metrics = SpeechMetrics {
        word_count,
        filler_count,
        words_per_minute,
        tips: Vec::new(),
    };
    metrics.tips = tips_for(&metrics);
    metrics
}

fn normalize_token(token: &str) -> String {
    token
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// Each token belongs to at most one match, so the count never exceeds the
/// number of tokens.
fn count_fillers(tokens: &[String]) -> usize {
    let mut count = 0;
    let mut i = 0;

    while i < tokens.len() {
        let rest = &tokens[i..];
        let phrase_len = MULTI_WORD_FILLERS
            .iter()
            .find(|phrase| {
                rest.len() >= phrase.len()
                    && phrase.iter().zip(rest).all(|(word, token)| *word == token)
            })
            .map(|phrase| phrase.len());

        match phrase_len {
            Some(len) => {
                count += 1;
                i += len;
            }
            None => {
                if SINGLE_WORD_FILLERS.contains(&tokens[i].as_str()) {
                    count += 1;
                }
                i += 1;
            }
        }
    }

    count
}

fn words_per_minute(word_count: usize, elapsed: Option<Duration>) -> f64 {
    if word_count == 0 {
        return 0.0;
    }

    match elapsed.filter(|d| *d >= MIN_RELIABLE_DURATION) {
        Some(duration) => (word_count as f64 * 60.0 / duration.as_secs_f64()).round(),
        None => (word_count as f64 * 60.0 / NOMINAL_DURATION.as_secs_f64())
            .round()
            .clamp(FALLBACK_MIN_WPM, FALLBACK_MAX_WPM),
    }
}

fn tips_for(metrics: &SpeechMetrics) -> Vec<String> {
    let mut tips: Vec<String> = TIP_RULES
        .iter()
        .filter(|rule| (rule.fires)(metrics))
        .map(|rule| rule.tip.to_string())
        .collect();

    if tips.is_empty() {
        tips.push(TIP_KEEP_GOING.to_string());
    }

    tips
}
