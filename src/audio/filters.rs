//! Band-pass filter bank that splits the dry signal into energy bands.

use std::f32::consts::PI;

use crate::params::BandRange;

/// Second-order (biquad) coefficients, normalized so a0 = 1.
///
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadCoeffs {
    /// Passes nothing
    pub const SILENT: Self = Self {
        b0: 0.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Cookbook band-pass with constant 0 dB peak gain.
    ///
    /// A center at or beyond Nyquist (or a non-positive Q) would give an
    /// unstable filter, so such bands are silent instead.
    pub fn bandpass(sample_rate_hz: f32, center_hz: f32, q: f32) -> Self {
        if !(center_hz > 0.0 && center_hz < sample_rate_hz * 0.5 && q > 0.0) {
            return Self::SILENT;
        }
        let w0 = 2.0 * PI * center_hz / sample_rate_hz;
        let alpha = w0.sin() / (2.0 * q);
        let cos_w0 = w0.cos();

        let a0 = 1.0 + alpha;
        Self {
            b0: alpha / a0,
            b1: 0.0,
            b2: -alpha / a0,
            a1: -2.0 * cos_w0 / a0,
            a2: (1.0 - alpha) / a0,
        }
    }
}

/// One running band-pass (Direct Form I)
#[derive(Debug, Clone)]
pub struct BandpassFilter {
    coeffs: BiquadCoeffs,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl BandpassFilter {
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self {
            coeffs,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Tuned to the band's geometric center with `Q = center / bandwidth`
    pub fn for_band(sample_rate_hz: f32, band: &BandRange) -> Self {
        Self::new(BiquadCoeffs::bandpass(
            sample_rate_hz,
            band.center_hz(),
            band.q(),
        ))
    }

    pub fn coeffs(&self) -> &BiquadCoeffs {
        &self.coeffs
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let c = &self.coeffs;
        let y = c.b0 * x + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }

    /// Clear filter history
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

/// One band-pass per energy band, all fed the same input
#[derive(Debug, Clone)]
pub struct FilterBank {
    filters: Vec<BandpassFilter>,
}

impl FilterBank {
    pub fn new(sample_rate_hz: f32, bands: &[BandRange]) -> Self {
        Self {
            filters: bands
                .iter()
                .map(|band| BandpassFilter::for_band(sample_rate_hz, band))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// `Σ_b bandpass_b(x) * gains[b]`; every filter runs even at zero gain.
    #[inline]
    pub fn process_weighted(&mut self, x: f32, gains: &[f32]) -> f32 {
        let mut sum = 0.0;
        for (filter, &gain) in self.filters.iter_mut().zip(gains) {
            sum += filter.process(x) * gain;
        }
        sum
    }

    pub fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
    }
}
