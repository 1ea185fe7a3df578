use crate::player::{PlayerConfig, TimelinePlayer};
use crate::timeline::Timeline;
use bevy_app::{App, Plugin, Update};
use bevy_ecs::prelude::*;
use bevy_time::{Real, Time};
use std::marker::PhantomData;

/// Plays a [`Timeline`] on an entity, advanced by `Time<I>` every frame.
///
/// Tween appliers capture their targets, so the entity only owns the playback.
#[derive(Component, Debug)]
pub struct PlayTimeline<I = ()> {
    player: TimelinePlayer,
    despawn: bool,
    remove: bool,
    _time: PhantomData<I>,
}

impl PlayTimeline<()> {
    #[track_caller]
    pub fn new(timeline: Timeline) -> Self {
        Self::new_with_time(timeline)
    }
}

impl PlayTimeline<Real> {
    /// Ignores pausing and time scaling of the virtual clock.
    #[track_caller]
    pub fn new_real_time(timeline: Timeline) -> Self {
        Self::new_with_time(timeline)
    }
}

impl<I> PlayTimeline<I> {
    #[track_caller]
    pub fn new_with_time(timeline: Timeline) -> Self {
        Self::with_config(timeline, PlayerConfig::default())
    }

    #[track_caller]
    pub fn with_config(timeline: Timeline, config: PlayerConfig) -> Self {
        let mut player = TimelinePlayer::new(timeline, config);
        player.play(config.forwards);
        Self::from_player(player)
    }

    /// Takes over a player as is; it only advances while playing.
    pub fn from_player(player: TimelinePlayer) -> Self {
        Self {
            player,
            despawn: false,
            remove: false,
            _time: PhantomData,
        }
    }

    /// After the timeline finished, despawn the entity.
    pub fn despawn(self) -> Self {
        Self {
            despawn: true,
            ..self
        }
    }

    // After the timeline finished, remove it (the component).
    pub fn remove_when_done(self) -> Self {
        Self {
            remove: true,
            ..self
        }
    }

    pub fn player(&self) -> &TimelinePlayer {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut TimelinePlayer {
        &mut self.player
    }
}

#[derive(Default)]
pub struct TimelinePlugin;

impl Plugin for TimelinePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                play_timeline_animation::<()>,
                play_timeline_animation::<Real>,
            )
                .chain(),
        );
    }
}

pub fn play_timeline_animation<I: Default + Send + Sync + 'static>(
    time: Res<Time<I>>,
    mut timelines_to_play: Query<(Entity, &mut PlayTimeline<I>)>,
    mut commands: Commands,
) {
    for (entity, mut play) in timelines_to_play.iter_mut() {
        if !play.player.is_playing() {
            continue;
        }
        if play.player.update(time.delta_seconds()).is_err() {
            // already logged by the player, don't repeat it every frame
            play.player.stop();
            continue;
        }
        if !play.player.is_playing() {
            tracing::debug!(?entity, context = play.player.context(), "timeline finished");
            if play.remove {
                commands.entity(entity).remove::<PlayTimeline<I>>();
            }
            if play.despawn {
                commands.entity(entity).despawn();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tween::{Lerp, Tweener};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn counting_timeline(counter: &Arc<AtomicUsize>) -> Timeline {
        let counter = counter.clone();
        Timeline::builder()
            .insert_callback(0.5, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .append_delay(0.5)
            .build()
    }

    fn world_with_time(virtual_secs: u64, real_secs: u64) -> World {
        let mut world = World::new();
        let mut time = Time::<()>::default();
        time.advance_by(Duration::from_secs(virtual_secs));
        world.insert_resource(time);
        let mut time = Time::<Real>::default();
        time.advance_by(Duration::from_secs(real_secs));
        world.insert_resource(time);
        world
    }

    #[test]
    fn test_tween_progress() {
        // GIVEN
        let mut world = world_with_time(1, 0);
        let play_id = world.register_system(play_timeline_animation::<()>);
        let value = Arc::new(Mutex::new(0.0));
        let target = value.clone();
        let timeline = Timeline::builder()
            .insert(
                0.0,
                Tweener::value(0.0, 10.0, Lerp, 2.0, move |x| *target.lock().unwrap() = x),
            )
            .build();
        let entity = world.spawn(PlayTimeline::new(timeline)).id();

        // WHEN
        world.run_system(play_id).unwrap();

        // THEN
        assert_eq!(*value.lock().unwrap(), 5.0);
        let play = world.get::<PlayTimeline>(entity).unwrap();
        assert!(play.player().is_playing());
        assert_eq!(play.player().timeline().time_passed(), 1.0);
    }

    #[test]
    fn test_remove_when_done() {
        // GIVEN
        let mut world = world_with_time(2, 0);
        let play_id = world.register_system(play_timeline_animation::<()>);
        let counter = Arc::new(AtomicUsize::new(0));
        let entity = world
            .spawn(PlayTimeline::new(counting_timeline(&counter)).remove_when_done())
            .id();

        // WHEN
        world.run_system(play_id).unwrap();

        // THEN
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(world.get::<PlayTimeline>(entity).is_none());
        assert!(world.get_entity(entity).is_some());
    }

    #[test]
    fn test_real_time_despawn() {
        // GIVEN
        let mut world = world_with_time(0, 1);
        let play_virtual = world.register_system(play_timeline_animation::<()>);
        let play_real = world.register_system(play_timeline_animation::<Real>);
        let counter = Arc::new(AtomicUsize::new(0));
        let entity = world
            .spawn(PlayTimeline::new_real_time(counting_timeline(&counter)).despawn())
            .id();

        // WHEN
        world.run_system(play_virtual).unwrap();
        world.run_system(play_real).unwrap();

        // THEN
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(world.get_entity(entity).is_none());
    }

    #[test]
    fn test_stopped_player_is_skipped() {
        // GIVEN
        let mut world = world_with_time(1, 0);
        let play_id = world.register_system(play_timeline_animation::<()>);
        let counter = Arc::new(AtomicUsize::new(0));
        let mut play = PlayTimeline::new(counting_timeline(&counter)).remove_when_done();
        play.player_mut().stop();
        let entity = world.spawn(play).id();

        // WHEN
        world.run_system(play_id).unwrap();

        // THEN
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(world.get::<PlayTimeline>(entity).is_some());
    }

    #[test]
    fn test_backwards_config() {
        // GIVEN
        let mut world = world_with_time(1, 0);
        let play_id = world.register_system(play_timeline_animation::<()>);
        let counter = Arc::new(AtomicUsize::new(0));
        let config = PlayerConfig {
            forwards: false,
            ..PlayerConfig::default()
        };
        let timeline = Timeline::builder()
            .insert_callback(0.25, {
                let counter = counter.clone();
                move |e| {
                    if !e.playing_forwards {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
            .append_delay(1.0)
            .build();
        let entity = world
            .spawn(PlayTimeline::<()>::with_config(timeline, config))
            .id();

        // WHEN
        world.run_system(play_id).unwrap();

        // THEN
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        let play = world.get::<PlayTimeline>(entity).unwrap();
        assert!((play.player().timeline().time_passed() - 0.25).abs() < 1e-6);
    }
}
