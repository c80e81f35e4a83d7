//! Exponential smoothing of reflection delay/gain between updates.

use super::reflections::Reflection;

/// One smoothed slot: where it is now and where it is heading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedReflection {
    pub delay_current: f32,
    pub delay_target: f32,
    pub gain_current: f32,
    pub gain_target: f32,
}

impl SmoothedReflection {
    /// Starts settled on the target, so a new slot has no transient
    fn settled(target: &Reflection) -> Self {
        Self {
            delay_current: target.delay,
            delay_target: target.delay,
            gain_current: target.gain,
            gain_target: target.gain,
        }
    }

    pub fn current(&self) -> Reflection {
        Reflection::new(self.delay_current, self.gain_current)
    }
}

/// Position-keyed smoothing state for a variable-length reflection set.
///
/// Slot `i` always follows the `i`-th incoming reflection, whatever echo it
/// happens to be this time. Used twice: once per simulation frame and once
/// per audio sample inside the renderer.
#[derive(Debug, Clone)]
pub struct ReflectionSmoother {
    delay_smoothing: f32,
    gain_smoothing: f32,
    state: Vec<SmoothedReflection>,
}

impl ReflectionSmoother {
    pub fn new(delay_smoothing: f32, gain_smoothing: f32) -> Self {
        Self::with_capacity(delay_smoothing, gain_smoothing, 0)
    }

    /// Preallocates `capacity` slots so retargeting up to that size never allocates.
    pub fn with_capacity(delay_smoothing: f32, gain_smoothing: f32, capacity: usize) -> Self {
        Self {
            delay_smoothing,
            gain_smoothing,
            state: Vec::with_capacity(capacity),
        }
    }

    /// Resize to `targets` and point each slot at its new target.
    ///
    /// Extra slots are dropped from the end; new slots start settled.
    pub fn retarget(&mut self, targets: &[Reflection]) {
        self.state.truncate(targets.len());
        for (slot, target) in self.state.iter_mut().zip(targets) {
            slot.delay_target = target.delay;
            slot.gain_target = target.gain;
        }
        let kept = self.state.len();
        self.state
            .extend(targets[kept..].iter().map(SmoothedReflection::settled));
    }

    /// Move every slot one step toward its target
    #[inline]
    pub fn step(&mut self) {
        for slot in &mut self.state {
            slot.delay_current += self.delay_smoothing * (slot.delay_target - slot.delay_current);
            slot.gain_current += self.gain_smoothing * (slot.gain_target - slot.gain_current);
        }
    }

    /// Retarget, step once and return the smoothed values.
    pub fn smooth(&mut self, targets: &[Reflection]) -> Vec<Reflection> {
        self.retarget(targets);
        self.step();
        self.iter().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = Reflection> + '_ {
        self.state.iter().map(SmoothedReflection::current)
    }

    pub fn state(&self) -> &[SmoothedReflection] {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn clear(&mut self) {
        self.state.clear();
    }
}
