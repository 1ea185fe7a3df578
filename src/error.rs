use thiserror::Error;

/// Misuse of a [`Timeline`](crate::Timeline) or [`TimelinePlayer`](crate::TimelinePlayer).
///
/// None of these are transient: they mean the caller computed a broken time value.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TimelineError {
    #[error("cannot scrub from {previous} to {current}: times must be finite")]
    NonFiniteTime { previous: f32, current: f32 },

    #[error("cannot advance by {delta}: delta time must be finite")]
    NonFiniteDelta { delta: f32 },
}

pub type Result<T, E = TimelineError> = std::result::Result<T, E>;
