mod retrying_engine_test;
mod symphonia_normalizer_test;
