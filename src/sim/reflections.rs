//! Discrete echo extraction from the broadband IR.

use std::cmp::Ordering;

use super::Outcome;

/// Direct peaks below this carry no usable reference level
pub const REFERENCE_EPSILON: f32 = 1e-12;

/// A discrete echo relative to the direct sound
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reflection {
    /// Seconds after the direct arrival
    pub delay: f32,
    /// Linear amplitude relative to the direct peak
    pub gain: f32,
}

impl Reflection {
    pub const fn new(delay: f32, gain: f32) -> Self {
        Self { delay, gain }
    }
}

/// Loudest first; equal gains keep the earlier echo first.
fn by_gain_descending(a: &Reflection, b: &Reflection) -> Ordering {
    b.gain
        .total_cmp(&a.gain)
        .then_with(|| a.delay.total_cmp(&b.delay))
}

/// Picks the strongest echoes after the direct-sound window
#[derive(Debug, Clone)]
pub struct ReflectionExtractor {
    /// Direct-sound window length (seconds)
    pub direct_window_s: f32,
    /// Output cap
    pub max_reflections: usize,
}

impl ReflectionExtractor {
    pub fn new(direct_window_s: f32, max_reflections: usize) -> Self {
        Self {
            direct_window_s,
            max_reflections,
        }
    }

    /// Strongest echoes of a broadband IR sampled at `sample_rate` bins/s.
    pub fn extract(&self, broadband: &[f32], sample_rate: f32) -> Vec<Reflection> {
        self.extract_with_outcome(broadband, sample_rate).0
    }

    /// Same as [`extract`](Self::extract), also reporting why the set is empty.
    pub fn extract_with_outcome(
        &self,
        broadband: &[f32],
        sample_rate: f32,
    ) -> (Vec<Reflection>, Outcome) {
        let Some(first_bin) = broadband.iter().position(|&e| e > 0.0) else {
            return (Vec::new(), Outcome::NoSignal);
        };

        let window_bins = (self.direct_window_s * sample_rate).floor() as usize;
        let end_bin = first_bin.saturating_add(window_bins).min(broadband.len());

        let direct_peak = broadband[first_bin..end_bin]
            .iter()
            .copied()
            .fold(0.0f32, f32::max);
        if direct_peak < REFERENCE_EPSILON {
            return (Vec::new(), Outcome::DegenerateReference);
        }

        let mut reflections: Vec<Reflection> = broadband[end_bin..]
            .iter()
            .enumerate()
            .filter(|(_, &energy)| energy > 0.0)
            .map(|(offset, &energy)| Reflection {
                delay: (end_bin + offset - first_bin) as f32 / sample_rate,
                gain: (energy / direct_peak).sqrt(),
            })
            .collect();

        if reflections.len() > self.max_reflections {
            if self.max_reflections == 0 {
                reflections.clear();
            } else {
                reflections.select_nth_unstable_by(self.max_reflections - 1, by_gain_descending);
                reflections.truncate(self.max_reflections);
            }
        }
        reflections.sort_unstable_by(by_gain_descending);

        (reflections, Outcome::Signal)
    }
}
