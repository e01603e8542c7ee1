mod analysis_pipeline;
mod feedback_composer;
mod metric_extractor;

pub use analysis_pipeline::{
    AnalysisError, AnalysisPipeline, InputRejection, PipelineConfig, PipelineStage,
};
pub use feedback_composer::{
    FeedbackComposer, FeedbackError, SYSTEM_PROMPT, build_prompt, parse_rubric_response,
};
pub use metric_extractor::{
    FALLBACK_MAX_WPM, FALLBACK_MIN_WPM, FAST_PACE_WPM, MAX_FILLERS, MIN_RELIABLE_DURATION,
    NOMINAL_DURATION, SLOW_PACE_WPM, TIP_CHECK_MICROPHONE, TIP_FEWER_FILLERS, TIP_KEEP_GOING,
    TIP_SLOW_DOWN, TIP_SPEED_UP, extract_metrics,
};
