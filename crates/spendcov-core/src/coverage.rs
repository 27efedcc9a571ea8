//! Coverage counts and the ratios derived from them.
//!
//! The core registry count is always the denominator. When no core place
//! matches a filter the ratio is `None` and renders as "no data" rather than
//! as a division artifact.

use serde::{Deserialize, Serialize};

/// Raw counts returned by the coverage query for one brand filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageCounts {
    pub core_count: i64,
    pub patterns_count: i64,
    pub spend_count: i64,
}

/// A dataset counted against the core registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Spend,
    Patterns,
    Core,
}

impl Metric {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Spend => "spend",
            Metric::Patterns => "patterns",
            Metric::Core => "core",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Metric::Spend => "Spend",
            Metric::Patterns => "Patterns",
            Metric::Core => "Core",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageResult {
    pub brand_filter: String,
    pub counts: CoverageCounts,
}

impl CoverageResult {
    #[must_use]
    pub fn new(brand_filter: impl Into<String>, counts: CoverageCounts) -> Self {
        Self {
            brand_filter: brand_filter.into(),
            counts,
        }
    }

    #[must_use]
    pub fn count(&self, metric: Metric) -> i64 {
        match metric {
            Metric::Spend => self.counts.spend_count,
            Metric::Patterns => self.counts.patterns_count,
            Metric::Core => self.counts.core_count,
        }
    }

    /// `count(metric) / core_count`, or `None` when no core place matched.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // place counts are far below 2^52
    pub fn ratio(&self, metric: Metric) -> Option<f64> {
        let core = self.counts.core_count;
        if core <= 0 {
            return None;
        }
        Some(self.count(metric) as f64 / core as f64)
    }

    #[must_use]
    pub fn spend_ratio(&self) -> Option<f64> {
        self.ratio(Metric::Spend)
    }

    #[must_use]
    pub fn patterns_ratio(&self) -> Option<f64> {
        self.ratio(Metric::Patterns)
    }

    /// Returns `true` when the core registry has no place for this filter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.core_count <= 0
    }

    /// Human-readable summary lines, one per non-core dataset.
    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        if self.is_empty() {
            return vec![format!(
                "No core places match '{}': no data, 0% coverage",
                self.brand_filter
            )];
        }

        let mut lines = vec![format!(
            "Core: {} places match '{}'",
            self.counts.core_count, self.brand_filter
        )];
        for metric in [Metric::Spend, Metric::Patterns] {
            lines.push(format!(
                "{}: {} of {} core places ({})",
                metric.label(),
                self.count(metric),
                self.counts.core_count,
                format_percent(self.ratio(metric)),
            ));
        }
        lines
    }
}

/// Format a ratio as a percentage with one decimal place; `None` renders as `0%`.
#[must_use]
pub fn format_percent(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{:.1}%", r * 100.0),
        None => "0%".to_string(),
    }
}
