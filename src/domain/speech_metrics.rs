use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechMetrics {
    pub word_count: usize,
    pub filler_count: usize,
    pub words_per_minute: f64,
    pub tips: Vec<String>,
}
