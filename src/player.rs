use crate::element::CallbackEvent;
use crate::error::{Result, TimelineError};
use crate::timeline::Timeline;
use serde::{Deserialize, Serialize};
use std::panic::Location;

/// Timelines shorter than this never loop; they would spin without making progress.
const MIN_LOOP_DURATION: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopMode {
    /// Restart from the beginning.
    #[default]
    Normal,
    /// Flip direction at each end.
    YoYo,
}

/// How many times a [`TimelinePlayer`] runs its timeline. `times == 0` loops forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Loop {
    pub times: u32,
    pub mode: LoopMode,
}

impl Loop {
    pub const TIMES_FOREVER: u32 = 0;
    pub const TIMES_SINGLE: u32 = 1;

    pub fn times(times: u32, mode: LoopMode) -> Self {
        Self { times, mode }
    }

    pub fn single() -> Self {
        Self::times(Self::TIMES_SINGLE, LoopMode::Normal)
    }

    /// There and back again.
    pub fn single_yoyo() -> Self {
        Self::times(2, LoopMode::YoYo)
    }

    pub fn forever(mode: LoopMode) -> Self {
        Self::times(Self::TIMES_FOREVER, mode)
    }

    pub fn is_forever(&self) -> bool {
        self.times == Self::TIMES_FOREVER
    }

    pub fn should_loop(&self, current_iteration: u32) -> bool {
        self.is_forever() || current_iteration < self.times - 1
    }
}

impl Default for Loop {
    fn default() -> Self {
        Self::single()
    }
}

/// Playback settings for a [`TimelinePlayer`], loadable from any serde format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub timescale: f32,
    pub forwards: bool,
    pub looping: Loop,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            timescale: 1.0,
            forwards: true,
            looping: Loop::single(),
        }
    }
}

type Listener = Box<dyn FnMut(CallbackEvent) + Send + Sync>;

/// Drives a [`Timeline`] from frame deltas: scaling, direction, looping and start/end
/// notifications.
pub struct TimelinePlayer {
    timeline: Timeline,
    pub timescale: f32,
    pub forwards: bool,
    pub looping: Loop,
    current_iteration: u32,
    playing: bool,
    on_start: Vec<Listener>,
    on_end: Vec<Listener>,
    context: String,
}

impl TimelinePlayer {
    /// The caller's location is kept as context for error reports.
    #[track_caller]
    pub fn new(timeline: Timeline, config: PlayerConfig) -> Self {
        Self {
            timeline,
            timescale: config.timescale,
            forwards: config.forwards,
            looping: config.looping,
            current_iteration: 0,
            playing: false,
            on_start: Vec::new(),
            on_end: Vec::new(),
            context: format!("player created at {}", Location::caller()),
        }
    }

    /// Replaces the caller location with a more descriptive context, e.g. the animated entity.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            ..self
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current_iteration(&self) -> u32 {
        self.current_iteration
    }

    pub fn add_on_start_callback(
        &mut self,
        callback: impl FnMut(CallbackEvent) + Send + Sync + 'static,
    ) -> &mut Self {
        self.on_start.push(Box::new(callback));
        self
    }

    pub fn add_on_end_callback(
        &mut self,
        callback: impl FnMut(CallbackEvent) + Send + Sync + 'static,
    ) -> &mut Self {
        self.on_end.push(Box::new(callback));
        self
    }

    /// Advances by `delta` seconds of frame time. Failures are logged with the player context and
    /// handed back to the caller.
    pub fn update(&mut self, delta: f32) -> Result<()> {
        let result = self.advance(delta * self.timescale);
        if let Err(err) = &result {
            tracing::error!(context = %self.context, %err, "timeline update failed");
        }
        result
    }

    fn advance(&mut self, delta: f32) -> Result<()> {
        if !delta.is_finite() {
            return Err(TimelineError::NonFiniteDelta { delta });
        }
        let mut remaining = delta;
        loop {
            let delta = if self.forwards { remaining } else { -remaining };
            if delta == 0.0 {
                return Ok(());
            }

            let at_start_edge = if self.forwards {
                self.timeline.is_at_zero()
            } else {
                self.timeline.is_at_duration()
            };
            if self.current_iteration == 0 && at_start_edge {
                Self::notify(&mut self.on_start, self.forwards);
            }

            let previous = self.timeline.time_passed();
            self.timeline.update(delta)?;

            let at_end_edge = if self.forwards {
                self.timeline.is_at_duration()
            } else {
                self.timeline.is_at_zero()
            };
            if !at_end_edge {
                return Ok(());
            }

            let edge = if self.forwards {
                self.timeline.duration()
            } else {
                0.0
            };
            if self.looping.should_loop(self.current_iteration)
                && self.timeline.duration() > MIN_LOOP_DURATION
            {
                self.current_iteration += 1;
                let leftover = self.skip_whole_cycles((previous + delta - edge).abs());
                if leftover >= remaining.abs() {
                    tracing::warn!(leftover, "timeline loop made no progress, dropping the rest");
                    remaining = 0.0;
                } else {
                    remaining = leftover;
                }
                tracing::debug!(
                    iteration = self.current_iteration,
                    mode = ?self.looping.mode,
                    "timeline looping"
                );
                match self.looping.mode {
                    LoopMode::YoYo => {
                        self.reverse();
                    }
                    LoopMode::Normal => self.rewind_time_passed(false),
                }
            } else {
                Self::notify(&mut self.on_end, self.forwards);
                self.stop();
                return Ok(());
            }
        }
    }

    /// Consumes the full loop cycles contained in `leftover` at once, as far as the loop count
    /// allows. Elements inside skipped cycles are not notified.
    fn skip_whole_cycles(&mut self, leftover: f32) -> f32 {
        let (period, iterations_per_period) = match self.looping.mode {
            LoopMode::Normal => (self.timeline.duration(), 1),
            LoopMode::YoYo => (2.0 * self.timeline.duration(), 2),
        };
        let whole = (leftover / period).floor();
        if whole < 1.0 {
            return leftover;
        }
        if self.looping.is_forever() {
            let skipped = (whole as u32).saturating_mul(iterations_per_period);
            self.current_iteration = self.current_iteration.saturating_add(skipped);
            return leftover % period;
        }
        let loops_left = self
            .looping
            .times
            .saturating_sub(self.current_iteration + 1);
        let periods = (whole as u32).min(loops_left / iterations_per_period);
        self.current_iteration += periods * iterations_per_period;
        leftover - periods as f32 * period
    }

    fn notify(listeners: &mut [Listener], forwards: bool) {
        let event = CallbackEvent {
            playing_forwards: forwards,
        };
        for listener in listeners.iter_mut() {
            listener(event);
        }
    }

    /// Plays from the start (or the end, when playing backwards).
    pub fn play(&mut self, forwards: bool) -> &mut Self {
        self.forwards = forwards;
        // rewind reads the direction
        self.rewind(false);
        self.resume()
    }

    /// Plays forwards from the start, jumping straight to `start_time`.
    pub fn play_from(&mut self, start_time: f32) -> Result<&mut Self> {
        self.forwards = true;
        self.rewind(false);
        self.resume();
        self.timeline.set_time_passed(start_time, true)?;
        Ok(self)
    }

    pub fn resume(&mut self) -> &mut Self {
        self.playing = true;
        self
    }

    /// Resumes from the current position in the given direction.
    pub fn resume_in(&mut self, forwards: bool) -> &mut Self {
        self.forwards = forwards;
        self.resume()
    }

    pub fn stop(&mut self) -> &mut Self {
        self.playing = false;
        self
    }

    /// Stops and puts every element into its start state.
    pub fn stop_and_reset_to_start(&mut self) -> &mut Self {
        self.stop();
        self.timeline.reset_to_start();
        self
    }

    /// Stops and puts every element into its end state.
    pub fn stop_and_reset_to_end(&mut self) -> &mut Self {
        self.stop();
        self.timeline.reset_to_end();
        self
    }

    pub fn reverse(&mut self) -> &mut Self {
        self.forwards = !self.forwards;
        self
    }

    pub fn rewind(&mut self, apply_effects_for_relative_tweens: bool) -> &mut Self {
        self.current_iteration = 0;
        self.rewind_time_passed(apply_effects_for_relative_tweens);
        self
    }

    fn rewind_time_passed(&mut self, apply_effects_for_relative_tweens: bool) {
        let target = if self.forwards {
            0.0
        } else {
            self.timeline.duration()
        };
        self.timeline.seek(target, apply_effects_for_relative_tweens);
    }
}

impl std::fmt::Debug for TimelinePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelinePlayer")
            .field("timeline", &self.timeline)
            .field("timescale", &self.timescale)
            .field("forwards", &self.forwards)
            .field("looping", &self.looping)
            .field("current_iteration", &self.current_iteration)
            .field("playing", &self.playing)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
