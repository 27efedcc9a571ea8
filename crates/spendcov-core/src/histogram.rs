//! Equal-width histograms for the spend distributions.

use serde::Serialize;

/// Bin count used for both the transaction-count and median-spend histograms.
pub const HISTOGRAM_BINS: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    /// Bucket `values` into `bin_count` equal-width bins spanning `[min, max]`.
    ///
    /// Non-finite values are skipped. The last bin is closed on both ends so
    /// the maximum lands inside it. An empty input (or `bin_count == 0`)
    /// produces no bins; when every value is identical a single bin holds them.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn from_values(values: &[f64], bin_count: usize) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bin_count == 0 {
            return Self::default();
        }

        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if (max - min).abs() < f64::EPSILON {
            return Self {
                bins: vec![HistogramBin {
                    lower: min,
                    upper: max,
                    count: finite.len(),
                }],
            };
        }

        let width = (max - min) / bin_count as f64;
        let mut bins: Vec<HistogramBin> = (0..bin_count)
            .map(|i| HistogramBin {
                lower: min + width * i as f64,
                upper: if i + 1 == bin_count {
                    max
                } else {
                    min + width * (i + 1) as f64
                },
                count: 0,
            })
            .collect();

        for value in finite {
            let idx = (((value - min) / width).floor() as usize).min(bin_count - 1);
            bins[idx].count += 1;
        }

        Self { bins }
    }

    /// Total number of values across all bins.
    #[must_use]
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Render one text bar per bin, scaled so the fullest bin spans `width` cells.
    #[must_use]
    pub fn render_bars(&self, width: usize) -> Vec<String> {
        let peak = self.bins.iter().map(|b| b.count).max().unwrap_or(0);
        self.bins
            .iter()
            .map(|bin| {
                let len = if peak == 0 {
                    0
                } else {
                    (bin.count * width).div_ceil(peak)
                };
                format!(
                    "{:>12.2} - {:<12.2} | {:<width$} {}",
                    bin.lower,
                    bin.upper,
                    "#".repeat(len),
                    bin.count,
                )
            })
            .collect()
    }
}
