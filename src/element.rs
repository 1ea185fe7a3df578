use crate::timeline::Timeline;
use crate::tween::Tweener;

/// What a [`TweenCallback`] learns when the playhead crosses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackEvent {
    pub playing_forwards: bool,
}

/// Which crossing directions a [`TweenCallback`] reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvokeOn {
    #[default]
    Both,
    Forward,
    Backward,
}

impl InvokeOn {
    pub fn accepts(self, event: CallbackEvent) -> bool {
        match self {
            InvokeOn::Both => true,
            InvokeOn::Forward => event.playing_forwards,
            InvokeOn::Backward => !event.playing_forwards,
        }
    }
}

/// Relative time window handed from a timeline to one of its elements.
///
/// `previous` and `current` are already relative to the element's start and clamped to its span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Step {
    pub(crate) previous: f32,
    pub(crate) current: f32,
    pub(crate) forward: bool,
    pub(crate) apply_relative: bool,
    pub(crate) exit: bool,
    pub(crate) reset: bool,
}

type CallbackFn = Box<dyn FnMut(CallbackEvent) + Send + Sync>;

/// An instant timeline element, fired once per crossing.
pub struct TweenCallback {
    invoke: CallbackFn,
    invoke_on: InvokeOn,
    fire_on_reset: bool,
}

impl TweenCallback {
    pub fn new(invoke: impl FnMut(CallbackEvent) + Send + Sync + 'static) -> Self {
        Self {
            invoke: Box::new(invoke),
            invoke_on: InvokeOn::Both,
            fire_on_reset: true,
        }
    }

    pub fn invoke_on(self, invoke_on: InvokeOn) -> Self {
        Self { invoke_on, ..self }
    }

    /// Do not fire when the timeline is being reset to its start or end, e.g. for callbacks
    /// that play sounds or restart particle systems.
    pub fn skip_on_reset(self) -> Self {
        Self {
            fire_on_reset: false,
            ..self
        }
    }

    pub(crate) fn step(&mut self, step: Step) {
        if step.reset && !self.fire_on_reset {
            return;
        }
        let event = CallbackEvent {
            playing_forwards: step.forward,
        };
        if self.invoke_on.accepts(event) {
            (self.invoke)(event);
        }
    }
}

impl std::fmt::Debug for TweenCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweenCallback")
            .field("invoke_on", &self.invoke_on)
            .field("fire_on_reset", &self.fire_on_reset)
            .finish_non_exhaustive()
    }
}

/// Switches something on while the playhead is inside its span and off once it leaves.
pub struct Toggle {
    duration: f32,
    switch: Box<dyn FnMut(bool) + Send + Sync>,
}

impl Toggle {
    pub fn new(duration: f32, switch: impl FnMut(bool) + Send + Sync + 'static) -> Self {
        Self {
            duration: duration.max(0.0),
            switch: Box::new(switch),
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    fn in_range(&self, time: f32) -> bool {
        time > 0.0 && time < self.duration
    }

    pub(crate) fn step(&mut self, step: Step) {
        let was_inside = self.in_range(step.previous);
        let inside = !step.exit;
        if was_inside != inside || step.exit {
            (self.switch)(inside);
        }
    }
}

impl std::fmt::Debug for Toggle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toggle")
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

/// Anything that can be placed on a [`Timeline`].
///
/// `Callback` is the only instant kind; everything else occupies a span.
#[derive(Debug)]
pub enum TimelineElement {
    Tween(Tweener),
    Callback(TweenCallback),
    Toggle(Toggle),
    Timeline(Box<Timeline>),
}

impl TimelineElement {
    pub fn duration(&self) -> f32 {
        match self {
            TimelineElement::Tween(tween) => tween.duration(),
            TimelineElement::Callback(_) => 0.0,
            TimelineElement::Toggle(toggle) => toggle.duration(),
            TimelineElement::Timeline(timeline) => timeline.duration(),
        }
    }

    pub fn is_instant(&self) -> bool {
        matches!(self, TimelineElement::Callback(_))
    }

    pub(crate) fn step(&mut self, step: Step) {
        match self {
            TimelineElement::Tween(tween) => tween.step(step),
            TimelineElement::Callback(callback) => callback.step(step),
            TimelineElement::Toggle(toggle) => toggle.step(step),
            TimelineElement::Timeline(timeline) => timeline.step(step),
        }
    }

    pub(crate) fn apply_state_at(&mut self, time: f32) {
        match self {
            TimelineElement::Tween(tween) => tween.apply_state_at(time),
            TimelineElement::Timeline(timeline) => timeline.apply_state_at(time),
            TimelineElement::Callback(_) | TimelineElement::Toggle(_) => {}
        }
    }
}

impl From<Tweener> for TimelineElement {
    fn from(tween: Tweener) -> Self {
        TimelineElement::Tween(tween)
    }
}

impl From<TweenCallback> for TimelineElement {
    fn from(callback: TweenCallback) -> Self {
        TimelineElement::Callback(callback)
    }
}

impl From<Toggle> for TimelineElement {
    fn from(toggle: Toggle) -> Self {
        TimelineElement::Toggle(toggle)
    }
}

impl From<Timeline> for TimelineElement {
    fn from(timeline: Timeline) -> Self {
        TimelineElement::Timeline(Box::new(timeline))
    }
}
