pub mod app_config;
pub mod catalog;
pub mod config;
pub mod coverage;
pub mod fixture;
pub mod histogram;
pub mod options;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{BrandCatalog, BrandEntry};
pub use config::{load_app_config, load_app_config_from_env};
pub use coverage::{CoverageCounts, CoverageResult, Metric};
pub use fixture::{load_fixture, FixtureFile, PatternRecord, Place, SpendRecord};
pub use histogram::{Histogram, HistogramBin, HISTOGRAM_BINS};
pub use options::{BrandKey, CacheTtl, ClosureFilter, CoverageOptions, ReportingWindow};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read fixture file {path}: {source}")]
    FixtureFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse fixture file: {0}")]
    FixtureFileParse(#[from] serde_yaml::Error),

    #[error("fixture validation failed: {0}")]
    Validation(String),
}
