mod analysis_pipeline_test;
mod feedback_composer_test;
