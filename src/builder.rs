use crate::element::{CallbackEvent, TimelineElement, TweenCallback};
use crate::timeline::{Effect, Timeline};

/// Collects elements at arbitrary times and compiles them into a [`Timeline`].
///
/// Insertion order does not matter; [`build`](Self::build) sorts by start time, keeping the
/// insertion order of elements that start together. `build` consumes the builder, so it can
/// neither be built twice nor extended afterwards.
#[derive(Debug, Default)]
pub struct TimelineBuilder {
    total_duration: f32,
    effects: Vec<Effect>,
}

impl TimelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every element starts at 0.
    pub fn parallel<E: Into<TimelineElement>>(elements: impl IntoIterator<Item = E>) -> Self {
        let mut builder = Self::new();
        for element in elements {
            builder.push(0.0, element);
        }
        builder
    }

    /// Each element starts when the previous one ends.
    pub fn sequential<E: Into<TimelineElement>>(elements: impl IntoIterator<Item = E>) -> Self {
        elements
            .into_iter()
            .fold(Self::new(), |builder, element| builder.append(element))
    }

    /// The n-th timeline starts `n * delay` seconds in.
    pub fn with_growing_delay(timelines: impl IntoIterator<Item = Timeline>, delay: f32) -> Self {
        let mut builder = Self::new();
        for (index, timeline) in timelines.into_iter().enumerate() {
            builder.push(delay * index as f32, timeline);
        }
        builder
    }

    /// Places `element` at `at` seconds.
    pub fn insert(mut self, at: f32, element: impl Into<TimelineElement>) -> Self {
        self.push(at, element);
        self
    }

    /// Like [`insert`](Self::insert), for builders held by mutable reference. Returns the time the
    /// element ends at.
    pub fn push(&mut self, at: f32, element: impl Into<TimelineElement>) -> f32 {
        if !at.is_finite() {
            tracing::warn!(at, "Inserting timeline element at a non-finite time");
        }
        debug_assert!(at.is_finite(), "timeline element inserted at {at}");
        let effect = Effect::new(at, element.into());
        let ends_at = effect.ends_at();
        self.total_duration = self.total_duration.max(ends_at);
        self.effects.push(effect);
        ends_at
    }

    pub fn insert_callback(
        self,
        at: f32,
        callback: impl FnMut(CallbackEvent) + Send + Sync + 'static,
    ) -> Self {
        self.insert(at, TweenCallback::new(callback))
    }

    /// Places `element` at the current end of the timeline.
    pub fn append(self, element: impl Into<TimelineElement>) -> Self {
        let at = self.total_duration;
        self.insert(at, element)
    }

    pub fn append_callback(
        self,
        callback: impl FnMut(CallbackEvent) + Send + Sync + 'static,
    ) -> Self {
        self.append(TweenCallback::new(callback))
    }

    /// Adds a gap before the next appended element, or trailing time at the end.
    pub fn append_delay(mut self, seconds: f32) -> Self {
        self.total_duration += seconds;
        self
    }

    pub fn total_duration(&self) -> f32 {
        self.total_duration
    }

    pub fn build(self) -> Timeline {
        let mut effects = self.effects;
        effects.sort_by(|a, b| a.starts_at().total_cmp(&b.starts_at()));
        Timeline::from_sorted(self.total_duration.max(0.0), effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Toggle;
    use crate::tween::{Lerp, Tweener};
    use std::sync::{Arc, Mutex};

    fn starts(timeline: &Timeline) -> Vec<f32> {
        timeline.effects().iter().map(Effect::starts_at).collect()
    }

    fn noop_tween(duration: f32) -> Tweener {
        Tweener::new(duration, Lerp, |_: f32, _: bool| {})
    }

    #[test]
    fn build_sorts_out_of_order_inserts() {
        let timeline = TimelineBuilder::new()
            .insert_callback(1.0, |_| {})
            .insert_callback(0.0, |_| {})
            .build();

        assert_eq!(starts(&timeline), vec![0.0, 1.0]);
        assert_eq!(timeline.duration(), 1.0);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut builder = TimelineBuilder::new();
        for id in 0..4 {
            let sink = order.clone();
            builder.push(0.5, TweenCallback::new(move |_| sink.lock().unwrap().push(id)));
        }
        builder.push(0.1, TweenCallback::new(|_| {}));
        let mut timeline = builder.build();

        timeline.scrub(0.0, 1.0, true, true, false, false).unwrap();

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn duration_covers_longest_element() {
        let mut builder = TimelineBuilder::new();
        assert_eq!(builder.push(0.5, noop_tween(2.0)), 2.5);
        assert_eq!(builder.push(1.0, noop_tween(0.5)), 1.5);
        assert_eq!(builder.build().duration(), 2.5);
    }

    #[test]
    fn negative_times_are_accepted() {
        let timeline = TimelineBuilder::new()
            .insert(0.0, noop_tween(1.0))
            .insert(-1.0, noop_tween(0.5))
            .build();

        assert_eq!(starts(&timeline), vec![-1.0, 0.0]);
        assert_eq!(timeline.duration(), 1.0);
    }

    #[test]
    fn empty_timeline_has_no_duration() {
        assert_eq!(TimelineBuilder::new().build().duration(), 0.0);
        assert!(Timeline::empty().effects().is_empty());
    }

    #[test]
    fn sequential_appends_back_to_back() {
        let timeline =
            TimelineBuilder::sequential([noop_tween(1.0), noop_tween(0.5), noop_tween(2.0)]).build();

        assert_eq!(starts(&timeline), vec![0.0, 1.0, 1.5]);
        assert_eq!(timeline.duration(), 3.5);
    }

    #[test]
    fn parallel_starts_everything_at_zero() {
        let timeline = TimelineBuilder::parallel(vec![
            TimelineElement::from(noop_tween(1.0)),
            Toggle::new(3.0, |_| {}).into(),
        ])
        .build();

        assert_eq!(starts(&timeline), vec![0.0, 0.0]);
        assert_eq!(timeline.duration(), 3.0);
    }

    #[test]
    fn append_delay_shifts_following_elements() {
        let timeline = TimelineBuilder::new()
            .append(noop_tween(1.0))
            .append_delay(0.5)
            .append_callback(|_| {})
            .append_delay(0.25)
            .build();

        assert_eq!(starts(&timeline), vec![0.0, 1.5]);
        assert_eq!(timeline.duration(), 1.75);
    }

    #[test]
    fn growing_delay_staggers_timelines() {
        let timelines = (0..3).map(|_| Timeline::single(noop_tween(1.0), 0.0));
        let timeline = TimelineBuilder::with_growing_delay(timelines, 0.25).build();

        assert_eq!(starts(&timeline), vec![0.0, 0.25, 0.5]);
        assert_eq!(timeline.duration(), 1.5);
    }

    #[test]
    fn negative_delay_never_yields_negative_duration() {
        let fired = Arc::new(Mutex::new(0));
        let sink = fired.clone();
        let mut timeline = TimelineBuilder::new()
            .insert_callback(0.0, move |_| *sink.lock().unwrap() += 1)
            .append_delay(-0.5)
            .build();

        assert_eq!(timeline.duration(), 0.0);
        timeline.scrub(0.0, 0.0, true, true, false, false).unwrap();
        timeline.update(1.0).unwrap();
        assert_eq!(*fired.lock().unwrap(), 1);
        assert!(timeline.is_at_zero());
    }

    #[test]
    fn non_finite_tween_duration_keeps_timeline_usable() {
        let mut timeline = TimelineBuilder::new()
            .insert(0.0, noop_tween(f32::NAN))
            .insert(0.0, noop_tween(f32::INFINITY))
            .append_delay(1.0)
            .build();

        assert_eq!(timeline.duration(), 1.0);
        timeline.set_time_passed(0.5, true).unwrap();
        timeline.apply_at_end();
        assert_eq!(timeline.time_passed(), 0.5);
    }

    #[test]
    fn single_applies_delay() {
        let timeline = Timeline::single(noop_tween(2.0), 0.5);

        assert_eq!(starts(&timeline), vec![0.5]);
        assert_eq!(timeline.duration(), 2.5);
    }
}
