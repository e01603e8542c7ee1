mod analyze;
mod health;

pub use analyze::{
    AnalyzeResponse, EndpointInfo, ErrorResponse, analyze_handler, analyze_info_handler,
};
pub use health::{HealthResponse, health_handler};
