//! Query options shared by every coverage, brand catalog and spend-row query.
//!
//! A single [`CoverageOptions`] value is fixed for the lifetime of a process:
//! every query is scoped to the same reporting window, closure rule and brand
//! column.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;

use crate::ConfigError;

pub const DEFAULT_WINDOW_START: &str = "2021-03-01";
pub const DEFAULT_WINDOW_END: &str = "2021-04-01";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Half-open `[start, end)` range matched against `date_range_start` of the
/// patterns and spend datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportingWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportingWindow {
    /// Build a window, rejecting empty or inverted ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvVar`] if `start >= end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ConfigError> {
        if start >= end {
            return Err(ConfigError::InvalidEnvVar {
                var: "SPENDCOV_WINDOW_END".to_string(),
                reason: format!("window end {end} must be after start {start}"),
            });
        }
        Ok(Self { start, end })
    }
}

impl Default for ReportingWindow {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2021, 4, 1).unwrap_or_default(),
        }
    }
}

impl std::fmt::Display for ReportingWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Whether permanently closed places count toward the core registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClosureFilter {
    IncludeAll,
    #[default]
    ExcludeClosed,
}

impl ClosureFilter {
    /// Bound as a boolean so the closure predicate stays a query parameter.
    #[must_use]
    pub fn includes_closed(self) -> bool {
        matches!(self, ClosureFilter::IncludeAll)
    }
}

impl std::str::FromStr for ClosureFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "include-all" => Ok(ClosureFilter::IncludeAll),
            "exclude-closed" => Ok(ClosureFilter::ExcludeClosed),
            other => Err(format!(
                "unknown closure filter '{other}'; expected include-all or exclude-closed"
            )),
        }
    }
}

impl std::fmt::Display for ClosureFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClosureFilter::IncludeAll => write!(f, "include-all"),
            ClosureFilter::ExcludeClosed => write!(f, "exclude-closed"),
        }
    }
}

/// Which brand column a filter is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BrandKey {
    /// `safegraph_brand_ids`
    Id,
    /// `brands`
    #[default]
    Name,
}

impl BrandKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BrandKey::Id => "id",
            BrandKey::Name => "name",
        }
    }
}

impl std::str::FromStr for BrandKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(BrandKey::Id),
            "name" => Ok(BrandKey::Name),
            other => Err(format!("unknown brand key '{other}'; expected id or name")),
        }
    }
}

impl std::fmt::Display for BrandKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Eviction policy for memoized query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTtl {
    Expires(Duration),
    Never,
}

impl CacheTtl {
    /// `0` means entries never expire.
    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        if secs == 0 {
            CacheTtl::Never
        } else {
            CacheTtl::Expires(Duration::from_secs(secs))
        }
    }

    /// Returns `true` if an entry of the given age must be refetched.
    #[must_use]
    pub fn is_expired(self, age: Duration) -> bool {
        match self {
            CacheTtl::Expires(ttl) => age >= ttl,
            CacheTtl::Never => false,
        }
    }
}

impl Default for CacheTtl {
    fn default() -> Self {
        CacheTtl::Expires(Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }
}

impl std::str::FromStr for CacheTtl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("none") || s.eq_ignore_ascii_case("never") {
            return Ok(CacheTtl::Never);
        }
        s.parse::<u64>()
            .map(CacheTtl::from_secs)
            .map_err(|e| format!("expected seconds or 'none': {e}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoverageOptions {
    pub window: ReportingWindow,
    pub closure_filter: ClosureFilter,
    pub brand_key: BrandKey,
    pub cache_ttl: CacheTtl,
}
