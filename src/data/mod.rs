pub mod samples;
pub mod trigger_config;
