//! Fun-Tween
//!
//! Scrubbable tween timelines. Tweens, callbacks and nested timelines are placed at fixed points
//! in time; moving the playhead in either direction notifies every element it crosses, in travel
//! order, with instant callbacks firing exactly once per crossing.
//!
//! Build a timeline and scrub it by hand:
//! ```
//! use fun_tween::*;
//! use std::sync::{Arc, Mutex};
//!
//! let position = Arc::new(Mutex::new(0.0));
//! let target = position.clone();
//! let mut timeline = Timeline::builder()
//!     // Move from 0 to 10 during the first second.
//!     .insert(
//!         0.0,
//!         Tweener::value(0.0, 10.0, EaseFunction::QuadraticInOut, 1.0, move |x| {
//!             *target.lock().unwrap() = x
//!         }),
//!     )
//!     // Fires whenever the playhead crosses the end, in either direction.
//!     .insert_callback(1.0, |event| println!("end crossed, forwards: {}", event.playing_forwards))
//!     .build();
//!
//! timeline.set_time_passed(0.5, true)?;
//! assert_eq!(*position.lock().unwrap(), 5.0);
//! # Ok::<(), TimelineError>(())
//! ```
//!
//! Or let a [`TimelinePlayer`] drive it from frame deltas, with looping:
//! ```
//! # use fun_tween::*;
//! let timeline = Timeline::builder()
//!     .insert_callback(0.5, |_| println!("halfway"))
//!     .append_delay(0.5)
//!     .build();
//! let config = PlayerConfig {
//!     looping: Loop::forever(LoopMode::YoYo),
//!     ..PlayerConfig::default()
//! };
//! let mut player = TimelinePlayer::new(timeline, config);
//! player.play(true);
//! player.update(1.0 / 60.0)?;
//! # Ok::<(), TimelineError>(())
//! ```
//!
//! With the `bevy` feature, timelines are played on entities:
//! ```no_run
//! use bevy_app::App;
//! use fun_tween::TimelinePlugin;
//!
//! App::new()
//!     // Advances every `PlayTimeline` component with `Time<()>` or `Time<Real>`
//!     .add_plugins(TimelinePlugin)
//!     .run();
//! ```

mod builder;
mod element;
mod error;
mod player;
#[cfg(feature = "bevy")]
mod plugin;
mod timeline;
mod tween;

pub use builder::*;
pub use element::{CallbackEvent, InvokeOn, TimelineElement, Toggle, TweenCallback};
pub use error::*;
pub use interpolation::EaseFunction;
pub use player::*;
#[cfg(feature = "bevy")]
pub use plugin::*;
pub use timeline::*;
pub use tween::*;
