pub mod config;
pub mod constants;

pub use config::{AnalysisConfig, BatchOptions, ConfigError, load_analysis_config};
