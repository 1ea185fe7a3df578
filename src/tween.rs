use crate::element::Step;
use interpolation::{lerp, Ease, EaseFunction};

/// Receives the eased value of a [`Tweener`] and writes it to whatever the tween animates.
pub trait TweenApplier: Send + Sync {
    fn apply(&mut self, value: f32, forward: bool);
}

/// Maps linear progress in `[0, 1]` to the value handed to a [`TweenApplier`].
pub trait Interpolator: Send + Sync + 'static {
    fn interpolate(&self, position: f32) -> f32;
}

impl<F> TweenApplier for F
where
    F: FnMut(f32, bool) + Send + Sync,
{
    fn apply(&mut self, value: f32, forward: bool) {
        self(value, forward)
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct Lerp;

impl Interpolator for Lerp {
    fn interpolate(&self, position: f32) -> f32 {
        position
    }
}

impl Interpolator for EaseFunction {
    fn interpolate(&self, position: f32) -> f32 {
        position.calc(*self)
    }
}

/// Punches away from 0 towards 1 and springs back, as if attached to 0 by an elastic.
///
/// `vibrato` is the number of swings (at least 2). `elasticity` in `[0, 1]` controls how far
/// the swings overshoot to the negative side: 1 oscillates fully, 0 never goes below 0.
#[derive(Clone, Debug)]
pub struct Punch {
    durations: Vec<f32>,
    targets: Vec<f32>,
}

impl Punch {
    pub fn new(vibrato: usize, elasticity: f32) -> Self {
        let elasticity = elasticity.clamp(0.0, 1.0);
        let swings = vibrato.max(2);
        let decay = 1.0 / swings as f32;

        let weights: Vec<f32> = (1..=swings).map(|i| i as f32 / swings as f32).collect();
        let total: f32 = weights.iter().sum();
        let durations = weights.into_iter().map(|w| w / total).collect();

        let mut strength = 1.0_f32;
        let mut targets = vec![0.0; swings];
        targets[0] = 1.0;
        for (i, target) in targets.iter_mut().enumerate().take(swings - 1).skip(1) {
            *target = if i % 2 != 0 {
                -(1.0_f32.max(-strength * elasticity).min(strength * elasticity))
            } else {
                1.0_f32.max(-strength).min(strength)
            };
            strength -= decay;
        }

        Self { durations, targets }
    }
}

impl Default for Punch {
    fn default() -> Self {
        Self::new(10, 1.0)
    }
}

impl Interpolator for Punch {
    fn interpolate(&self, position: f32) -> f32 {
        let last = self.durations.len() - 1;
        let mut remaining = position;
        let mut idx = 0;
        while idx < last && remaining > self.durations[idx] {
            remaining -= self.durations[idx];
            idx += 1;
        }
        let from = if idx == 0 { 0.0 } else { self.targets[idx - 1] };
        let ratio = remaining / self.durations[idx];
        lerp(&from, &self.targets[idx], &ratio.quadratic_out())
    }
}

/// A continuous timeline element: a span of `duration` seconds that feeds eased progress to an
/// applier.
///
/// Absolute tweens hand over the eased value itself. Relative tweens hand over the change of the
/// eased value since the previous notification, for appliers that add onto the current state.
pub struct Tweener {
    duration: f32,
    relative: bool,
    function: Box<dyn Interpolator>,
    applier: Box<dyn TweenApplier>,
}

impl Tweener {
    pub fn new(
        duration: f32,
        function: impl Interpolator,
        applier: impl TweenApplier + 'static,
    ) -> Self {
        let duration = if !duration.is_finite() || duration < 0.0 {
            tracing::warn!(duration, "Got negative or non-finite tween duration, forcing to 0");
            0.0
        } else {
            duration
        };
        Self {
            duration,
            relative: false,
            function: Box::new(function),
            applier: Box::new(applier),
        }
    }

    pub fn relative(
        duration: f32,
        function: impl Interpolator,
        applier: impl TweenApplier + 'static,
    ) -> Self {
        Self {
            relative: true,
            ..Self::new(duration, function, applier)
        }
    }

    /// Tweens a plain `f32` from `from` to `to`, passing every intermediate value to `setter`.
    pub fn value(
        from: f32,
        to: f32,
        function: impl Interpolator,
        duration: f32,
        mut setter: impl FnMut(f32) + Send + Sync + 'static,
    ) -> Self {
        Self::new(duration, function, move |y: f32, _forward: bool| {
            setter(lerp(&from, &to, &y))
        })
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn is_relative(&self) -> bool {
        self.relative
    }

    fn eval_at(&self, time: f32) -> f32 {
        self.function
            .interpolate((time / self.duration).clamp(0.0, 1.0))
    }

    pub(crate) fn step(&mut self, step: Step) {
        if self.relative && !step.apply_relative {
            return;
        }
        let value = if self.duration == 0.0 {
            match (step.forward, self.relative) {
                (true, _) => 1.0,
                (false, false) => 0.0,
                (false, true) => -1.0,
            }
        } else if self.relative {
            self.eval_at(step.current) - self.eval_at(step.previous)
        } else {
            self.eval_at(step.current)
        };
        self.applier.apply(value, step.forward);
    }

    /// Forces the state this tween would have at `time`. Relative tweens have no state at a fixed
    /// point in time and are left alone.
    pub(crate) fn apply_state_at(&mut self, time: f32) {
        if self.relative {
            return;
        }
        let value = if self.duration == 0.0 {
            1.0
        } else {
            self.eval_at(time)
        };
        self.applier.apply(value, true);
    }
}

impl std::fmt::Debug for Tweener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tweener")
            .field("duration", &self.duration)
            .field("relative", &self.relative)
            .finish_non_exhaustive()
    }
}
