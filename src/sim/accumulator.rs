//! Leaky integration of noisy per-frame IR probes.

use tracing::debug;

use super::histogram::IrHistogram;

/// Persistent IR estimate built from one sparse probe per simulation frame.
///
/// Every cell follows `acc = acc * decay + frame`, so a constant input `c`
/// settles at `c / (1 - decay)`. The buffer is only reallocated when the
/// incoming frame changes shape (room or configuration reload).
#[derive(Debug, Clone)]
pub struct IrAccumulator {
    histogram: IrHistogram,
    frames: u64,
}

impl IrAccumulator {
    pub fn new(bins: usize, bands: usize) -> Self {
        Self {
            histogram: IrHistogram::new(bins, bands),
            frames: 0,
        }
    }

    /// Merge one frame into the estimate and return the updated estimate.
    pub fn accumulate(&mut self, frame: &IrHistogram, decay: f32) -> &IrHistogram {
        if !self.histogram.same_shape(frame) {
            debug!(
                bins = frame.bins(),
                bands = frame.bands(),
                "IR shape changed, reallocating accumulator"
            );
            self.histogram = IrHistogram::new(frame.bins(), frame.bands());
            self.frames = 0;
        }

        for (acc, input) in self
            .histogram
            .as_mut_slice()
            .iter_mut()
            .zip(frame.as_slice())
        {
            *acc = *acc * decay + input;
        }
        self.frames += 1;

        &self.histogram
    }

    pub fn histogram(&self) -> &IrHistogram {
        &self.histogram
    }

    /// Frames merged since creation or the last shape change
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn reset(&mut self) {
        self.histogram.clear();
        self.frames = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_frame(bins: usize, bands: usize, value: f32) -> IrHistogram {
        IrHistogram::from_data(bins, bands, vec![value; bins * bands]).unwrap()
    }

    #[test]
    fn test_single_frame_passthrough() {
        let mut acc = IrAccumulator::new(8, 2);
        let mut frame = IrHistogram::new(8, 2);
        frame.set(3, 1, 2.5);

        let out = acc.accumulate(&frame, 0.9);
        assert_eq!(out.get(3, 1), 2.5);
        assert_eq!(out.get(3, 0), 0.0);
        assert_eq!(acc.frames(), 1);
    }

    #[test]
    fn test_steady_state() {
        // decay 0.9 → steady state 10x the per-frame input
        let mut acc = IrAccumulator::new(4, 2);
        let frame = constant_frame(4, 2, 1.5);

        for _ in 0..400 {
            acc.accumulate(&frame, 0.9);
        }

        for &value in acc.histogram().as_slice() {
            assert!((value - 15.0).abs() < 1e-3, "got {}", value);
        }
    }

    #[test]
    fn test_zero_decay_keeps_latest_frame() {
        let mut acc = IrAccumulator::new(2, 1);
        acc.accumulate(&constant_frame(2, 1, 3.0), 0.0);
        acc.accumulate(&constant_frame(2, 1, 1.0), 0.0);
        assert_eq!(acc.histogram().as_slice(), &[1.0, 1.0]);
    }

    #[test]
    fn test_shape_change_reallocates() {
        let mut acc = IrAccumulator::new(4, 2);
        acc.accumulate(&constant_frame(4, 2, 1.0), 0.5);
        acc.accumulate(&constant_frame(4, 2, 1.0), 0.5);
        assert_eq!(acc.frames(), 2);

        let out = acc.accumulate(&constant_frame(6, 3, 2.0), 0.5);
        assert_eq!(out.bins(), 6);
        assert_eq!(out.bands(), 3);
        assert!(out.as_slice().iter().all(|&v| v == 2.0));
        assert_eq!(acc.frames(), 1);
    }

    #[test]
    fn test_reset() {
        let mut acc = IrAccumulator::new(2, 2);
        acc.accumulate(&constant_frame(2, 2, 1.0), 0.9);
        acc.reset();
        assert!(acc.histogram().as_slice().iter().all(|&v| v == 0.0));
        assert_eq!(acc.frames(), 0);
    }
}
