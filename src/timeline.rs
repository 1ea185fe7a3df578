use crate::builder::TimelineBuilder;
use crate::element::{Step, TimelineElement};
use crate::error::{Result, TimelineError};

/// An element placed on a timeline, spanning `[starts_at, ends_at]`.
#[derive(Debug)]
pub struct Effect {
    starts_at: f32,
    ends_at: f32,
    element: TimelineElement,
}

impl Effect {
    pub(crate) fn new(starts_at: f32, element: TimelineElement) -> Self {
        Self {
            starts_at,
            ends_at: starts_at + element.duration(),
            element,
        }
    }

    pub fn starts_at(&self) -> f32 {
        self.starts_at
    }

    pub fn ends_at(&self) -> f32 {
        self.ends_at
    }

    pub fn duration(&self) -> f32 {
        self.ends_at - self.starts_at
    }

    pub fn element(&self) -> &TimelineElement {
        &self.element
    }

    fn relativize(&self, time: f32) -> f32 {
        time.clamp(self.starts_at, self.ends_at) - self.starts_at
    }

    fn play_forwards(&mut self, step: Step, direction_changed: bool, timeline_end: f32) {
        if step.current < self.starts_at || step.previous > self.ends_at {
            return;
        }
        let exit = step.current > self.ends_at
            || (step.exit && step.current >= self.ends_at && self.ends_at >= timeline_end);
        let (previous, current) = if step.previous == self.ends_at {
            // Already consumed while travelling in this direction.
            if !direction_changed {
                return;
            }
            (self.duration(), self.duration())
        } else {
            (self.relativize(step.previous), self.relativize(step.current))
        };
        self.element.step(Step {
            previous,
            current,
            forward: true,
            exit,
            ..step
        });
    }

    fn play_backwards(&mut self, step: Step, direction_changed: bool) {
        if step.current > self.ends_at || step.previous < self.starts_at {
            return;
        }
        let exit = step.current < self.starts_at
            || (step.exit && step.current <= self.starts_at && self.starts_at <= 0.0);
        let (previous, current) = if step.previous == self.starts_at {
            if !direction_changed {
                return;
            }
            (0.0, 0.0)
        } else {
            (self.relativize(step.previous), self.relativize(step.current))
        };
        self.element.step(Step {
            previous,
            current,
            forward: false,
            exit,
            ..step
        });
    }
}

/// Where the playhead was left by the last scrub.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playhead {
    /// Clamped to `[0, duration]`.
    pub time: f32,
    pub forward: bool,
}

/// Elements arranged in time, driven by scrubbing a playhead over them.
///
/// The element list is sorted by start time and never changes after
/// [`TimelineBuilder::build`]. The only mutable state is the [`Playhead`].
#[derive(Debug)]
pub struct Timeline {
    duration: f32,
    effects: Vec<Effect>,
    playhead: Option<Playhead>,
}

impl Timeline {
    pub(crate) fn from_sorted(duration: f32, effects: Vec<Effect>) -> Self {
        Self {
            duration,
            effects,
            playhead: None,
        }
    }

    pub fn builder() -> TimelineBuilder {
        TimelineBuilder::new()
    }

    /// A timeline without elements. Every timeline owns its playhead, so this is not a constant.
    pub fn empty() -> Self {
        Self::from_sorted(0.0, Vec::new())
    }

    /// A timeline holding a single element, starting after `delay`.
    pub fn single(element: impl Into<TimelineElement>, delay: f32) -> Self {
        TimelineBuilder::new().insert(delay, element).build()
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// `None` until the first scrub.
    pub fn playhead(&self) -> Option<Playhead> {
        self.playhead
    }

    pub fn time_passed(&self) -> f32 {
        self.playhead.map_or(0.0, |playhead| playhead.time)
    }

    pub fn is_at_zero(&self) -> bool {
        self.time_passed() == 0.0
    }

    pub fn is_at_duration(&self) -> bool {
        self.time_passed() == self.duration
    }

    /// Moves the playhead from `previous_time_passed` to `time_passed`, notifying every element
    /// the move crosses.
    ///
    /// Elements are visited in ascending start order when `playing_forwards`, descending
    /// otherwise. An element sitting exactly on `previous_time_passed` was already consumed by the
    /// previous call and only fires again when the direction flipped. The very first scrub counts
    /// as a flip, so an element at the starting point fires.
    ///
    /// `apply_effects_for_relative_tweens` gates relative tweens, `exit_tween` marks that the
    /// playhead is leaving this timeline as a whole, and `is_reset` lets callbacks opt out of
    /// firing while the timeline is being rewound.
    ///
    /// Times outside `[0, duration]` are fine. Non-finite times are rejected before anything is
    /// notified.
    pub fn scrub(
        &mut self,
        previous_time_passed: f32,
        time_passed: f32,
        playing_forwards: bool,
        apply_effects_for_relative_tweens: bool,
        exit_tween: bool,
        is_reset: bool,
    ) -> Result<()> {
        if !previous_time_passed.is_finite() || !time_passed.is_finite() {
            return Err(TimelineError::NonFiniteTime {
                previous: previous_time_passed,
                current: time_passed,
            });
        }
        self.step(Step {
            previous: previous_time_passed,
            current: time_passed,
            forward: playing_forwards,
            apply_relative: apply_effects_for_relative_tweens,
            exit: exit_tween,
            reset: is_reset,
        });
        Ok(())
    }

    pub(crate) fn step(&mut self, step: Step) {
        let clamped = step.current.clamp(0.0, self.duration);
        let direction_changed = self
            .playhead
            .map_or(true, |playhead| playhead.forward != step.forward);
        self.playhead = Some(Playhead {
            time: clamped,
            forward: step.forward,
        });

        if step.previous == clamped && !direction_changed {
            return;
        }

        let duration = self.duration;
        if step.forward {
            for effect in self.effects.iter_mut() {
                effect.play_forwards(step, direction_changed, duration);
            }
        } else {
            for effect in self.effects.iter_mut().rev() {
                effect.play_backwards(step, direction_changed);
            }
        }
    }

    /// Moves the playhead to `time_passed` (clamped), inferring the direction from the current
    /// position. Does nothing when the position would not change.
    pub fn set_time_passed(
        &mut self,
        time_passed: f32,
        apply_effects_for_relative_tweens: bool,
    ) -> Result<()> {
        let current = self.time_passed();
        if !time_passed.is_finite() {
            return Err(TimelineError::NonFiniteTime {
                previous: current,
                current: time_passed,
            });
        }
        self.seek(time_passed, apply_effects_for_relative_tweens);
        Ok(())
    }

    /// Infallible [`Self::set_time_passed`] for times already known to be finite.
    pub(crate) fn seek(&mut self, time_passed: f32, apply_effects_for_relative_tweens: bool) {
        let current = self.time_passed();
        let target = time_passed.clamp(0.0, self.duration);
        if target == current {
            return;
        }
        self.step(Step {
            previous: current,
            current: target,
            forward: target >= current,
            apply_relative: apply_effects_for_relative_tweens,
            exit: false,
            reset: false,
        });
    }

    pub fn set_time_passed_percentage(&mut self, percentage: f32) -> Result<()> {
        self.set_time_passed(self.duration * percentage, true)
    }

    /// Advances the playhead by `delta` seconds; negative deltas play backwards.
    pub fn update(&mut self, delta: f32) -> Result<()> {
        if !delta.is_finite() {
            return Err(TimelineError::NonFiniteDelta { delta });
        }
        if delta == 0.0 {
            return Ok(());
        }
        self.seek(self.time_passed() + delta, true);
        Ok(())
    }

    /// Puts every element into its start state without running relative effects.
    ///
    /// Useful when an element starts later than the timeline and its target would otherwise
    /// stutter from wherever it was left.
    pub fn reset_to_start(&mut self) {
        self.step(Step {
            previous: self.duration,
            current: 0.0,
            forward: false,
            apply_relative: false,
            exit: false,
            reset: true,
        });
    }

    /// Puts every element into its end state without running relative effects.
    pub fn reset_to_end(&mut self) {
        self.step(Step {
            previous: 0.0,
            current: self.duration,
            forward: true,
            apply_relative: false,
            exit: false,
            reset: true,
        });
    }

    /// Forces absolute tweens into the state they would have at `time`, leaving the playhead
    /// alone. Callbacks do not fire.
    pub fn apply_state_at(&mut self, time: f32) {
        for effect in self.effects.iter_mut() {
            if time >= effect.starts_at && time <= effect.ends_at {
                let relative = effect.relativize(time);
                effect.element.apply_state_at(relative);
            }
        }
    }

    pub fn apply_at_start(&mut self) {
        self.apply_state_at(0.0)
    }

    pub fn apply_at_end(&mut self) {
        self.apply_state_at(self.duration)
    }
}
