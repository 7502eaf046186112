use serde::Serialize;

/// Plain count histogram with integer-indexed bins.
///
/// Fills past the last bin either grow the axis (extendable histograms) or are
/// tallied in a single out-of-range counter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountHistogram {
    bins: Vec<f64>,
    extendable: bool,
    out_of_range: f64,
    entries: u64,
}

impl CountHistogram {
    /// Fixed axis of `num_bins` bins
    pub fn new(num_bins: usize) -> Self {
        Self {
            bins: vec![0.0; num_bins],
            extendable: false,
            out_of_range: 0.0,
            entries: 0,
        }
    }

    /// Axis of `num_bins` bins that grows to fit any filled index
    pub fn extendable(num_bins: usize) -> Self {
        Self {
            extendable: true,
            ..Self::new(num_bins)
        }
    }

    pub fn fill(&mut self, bin: usize) {
        self.fill_weighted(bin, 1.0);
    }

    pub fn fill_weighted(&mut self, bin: usize, weight: f64) {
        if bin >= self.bins.len() {
            if self.extendable {
                self.bins.resize(bin + 1, 0.0);
            } else {
                self.out_of_range += weight;
                self.entries += 1;
                return;
            }
        }
        self.bins[bin] += weight;
        self.entries += 1;
    }

    /// Content of `bin`, 0.0 beyond the axis
    pub fn get(&self, bin: usize) -> f64 {
        self.bins.get(bin).copied().unwrap_or(0.0)
    }

    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn is_extendable(&self) -> bool {
        self.extendable
    }

    pub fn out_of_range(&self) -> f64 {
        self.out_of_range
    }

    /// Number of fill calls since the last reset
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Sum of in-range bin contents
    pub fn total(&self) -> f64 {
        self.bins.iter().sum()
    }

    /// Zero all contents; the axis keeps its current size
    pub fn reset(&mut self) {
        self.bins.iter_mut().for_each(|b| *b = 0.0);
        self.out_of_range = 0.0;
        self.entries = 0;
    }
}
