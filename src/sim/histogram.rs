//! Time-bin × band energy histogram.

/// Energy arriving per time bin per frequency band.
///
/// Stored row-major: all bands of bin 0, then all bands of bin 1, ...
#[derive(Debug, Clone, PartialEq)]
pub struct IrHistogram {
    bins: usize,
    bands: usize,
    data: Vec<f32>,
}

impl IrHistogram {
    /// All-zero histogram
    pub fn new(bins: usize, bands: usize) -> Self {
        Self {
            bins,
            bands,
            data: vec![0.0; bins * bands],
        }
    }

    /// Wraps row-major data; `None` if the length does not match the dimensions.
    pub fn from_data(bins: usize, bands: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == bins * bands).then_some(Self { bins, bands, data })
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    pub fn same_shape(&self, other: &Self) -> bool {
        self.bins == other.bins && self.bands == other.bands
    }

    pub fn get(&self, bin: usize, band: usize) -> f32 {
        self.data[bin * self.bands + band]
    }

    pub fn set(&mut self, bin: usize, band: usize, value: f32) {
        self.data[bin * self.bands + band] = value;
    }

    /// Adds energy to a cell; out-of-range bins are dropped.
    pub fn add(&mut self, bin: usize, band: usize, energy: f32) {
        if bin < self.bins && band < self.bands {
            self.data[bin * self.bands + band] += energy;
        }
    }

    /// All bands of one time bin
    pub fn row(&self, bin: usize) -> &[f32] {
        &self.data[bin * self.bands..(bin + 1) * self.bands]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact(0) panics
        self.data.chunks_exact(self.bands.max(1)).take(self.bins)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    /// Sum over bands per time bin
    pub fn broadband(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.bins);
        self.broadband_into(&mut out);
        out
    }

    /// Like [`broadband`](Self::broadband) but reuses `out`'s allocation.
    pub fn broadband_into(&self, out: &mut Vec<f32>) {
        out.clear();
        if self.bands == 0 {
            out.resize(self.bins, 0.0);
            return;
        }
        out.extend(self.rows().map(|row| row.iter().sum::<f32>()));
    }

    /// Total energy per band over all bins
    pub fn band_totals(&self) -> Vec<f32> {
        let mut totals = vec![0.0; self.bands];
        for row in self.rows() {
            for (total, value) in totals.iter_mut().zip(row) {
                *total += value;
            }
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_and_broadband() {
        let mut ir = IrHistogram::new(4, 3);
        ir.set(0, 0, 1.0);
        ir.set(0, 2, 2.0);
        ir.add(3, 1, 0.5);
        ir.add(3, 1, 0.5);
        ir.add(99, 0, 7.0);

        assert_eq!(ir.row(0), &[1.0, 0.0, 2.0]);
        assert_eq!(ir.get(3, 1), 1.0);
        assert_eq!(ir.broadband(), vec![3.0, 0.0, 0.0, 1.0]);
        assert_eq!(ir.band_totals(), vec![1.0, 1.0, 2.0]);
    }

    #[test]
    fn test_from_data_checks_shape() {
        assert!(IrHistogram::from_data(2, 2, vec![0.0; 4]).is_some());
        assert!(IrHistogram::from_data(2, 2, vec![0.0; 5]).is_none());
    }

    #[test]
    fn test_zero_band_histogram() {
        let ir = IrHistogram::new(3, 0);
        assert_eq!(ir.broadband(), vec![0.0; 3]);
        assert_eq!(ir.rows().count(), 0);
    }
}
