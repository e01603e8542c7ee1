use std::sync::Arc;

use crate::application::ports::LlmClient;
use crate::application::services::AnalysisPipeline;
use crate::presentation::config::Settings;

pub struct AppState<L>
where
    L: LlmClient,
{
    pub pipeline: Arc<AnalysisPipeline<L>>,
    pub settings: Settings,
}

impl<L> Clone for AppState<L>
where
    L: LlmClient,
{
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            settings: self.settings.clone(),
        }
    }
}
