//! Numerator/denominator histogram over a growable categorical axis.
//!
//! Counts accumulate per label in the numerator, live time accumulates in a
//! single denominator bin. The ratio is a derived view: it is recomputed only
//! by [`RatioHistogram::normalize`] and is stale in between.

use crate::utils::math::safe_ratio;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct RatioHistogram<L> {
    labels: Vec<L>,
    index: HashMap<L, usize>,
    numerator: Vec<f64>,
    denominator: f64,
    ratio: Vec<f64>,
    stale: bool,
}

impl<L: Clone + Eq + Hash> Default for RatioHistogram<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Clone + Eq + Hash> RatioHistogram<L> {
    /// Create an empty histogram; bins appear as labels are accumulated
    pub fn new() -> Self {
        Self {
            labels: Vec::new(),
            index: HashMap::new(),
            numerator: Vec::new(),
            denominator: 0.0,
            ratio: Vec::new(),
            stale: false,
        }
    }

    /// Create a histogram whose axis starts with `labels`, in order.
    ///
    /// Repeated labels are collapsed onto their first position.
    pub fn with_labels<I: IntoIterator<Item = L>>(labels: I) -> Self {
        let mut histogram = Self::new();
        for label in labels {
            histogram.bin_for(label);
        }
        histogram.ratio = vec![0.0; histogram.labels.len()];
        histogram
    }

    fn bin_for(&mut self, label: L) -> usize {
        if let Some(&bin) = self.index.get(&label) {
            return bin;
        }
        let bin = self.labels.len();
        self.index.insert(label.clone(), bin);
        self.labels.push(label);
        self.numerator.push(0.0);
        bin
    }

    /// Add `weight` to the numerator bin of `label`, appending the bin if new
    pub fn accumulate(&mut self, label: L, weight: f64) {
        let bin = self.bin_for(label);
        self.numerator[bin] += weight;
        self.stale = true;
    }

    /// Add `weight` (live time) to the denominator
    pub fn accumulate_duration(&mut self, weight: f64) {
        self.denominator += weight;
        self.stale = true;
    }

    /// Recompute `ratio[i] = numerator[i] / denominator` for every bin.
    ///
    /// With a zero denominator every ratio is 0.0. Calling this again without
    /// new accumulation yields identical values.
    pub fn normalize(&mut self) {
        if self.denominator == 0.0 {
            debug!(
                bins = self.numerator.len(),
                "denominator is zero, ratios set to 0"
            );
        }
        let denominator = self.denominator;
        self.ratio.clear();
        self.ratio
            .extend(self.numerator.iter().map(|&count| safe_ratio(count, denominator)));
        self.stale = false;
    }

    /// Zero numerator, denominator and ratio, keeping every known label
    pub fn reset(&mut self) {
        self.numerator.iter_mut().for_each(|count| *count = 0.0);
        self.denominator = 0.0;
        self.ratio.clear();
        self.ratio.resize(self.labels.len(), 0.0);
        self.stale = false;
    }

    /// Labels in the order they were discovered
    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    pub fn numerator(&self, label: &L) -> Option<f64> {
        self.index.get(label).map(|&bin| self.numerator[bin])
    }

    /// Numerator values, parallel to [`labels`](Self::labels)
    pub fn numerators(&self) -> &[f64] {
        &self.numerator
    }

    pub fn denominator(&self) -> f64 {
        self.denominator
    }

    /// Ratio for `label` as of the last normalisation.
    ///
    /// `None` for unknown labels and for labels discovered since then.
    pub fn ratio(&self, label: &L) -> Option<f64> {
        self.index
            .get(label)
            .and_then(|&bin| self.ratio.get(bin).copied())
    }

    /// Ratio values as of the last normalisation
    pub fn ratios(&self) -> &[f64] {
        &self.ratio
    }

    /// Whether numerator or denominator changed since the last normalisation
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
