use thiserror::Error;

/// Errors raised while building a [`SimConfig`](crate::config::SimConfig).
///
/// Every variant is fatal: a run is never started from a configuration that
/// failed validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A real-valued parameter that must be strictly positive was not.
    #[error("{field} must be a positive finite number, got {value}")]
    NonPositive {
        /// Name of the offending parameter.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The network must contain at least one station.
    #[error("number of stations must be at least 1")]
    NoStations,
    /// The backoff exponent bound would overflow the backoff window.
    #[error("max backoff must be at most {max}, got {value}")]
    BackoffTooLarge {
        /// The rejected bound.
        value: u32,
        /// Largest accepted bound.
        max: u32,
    },
    /// The time-driven step is coarser than one frame.
    #[error("time step {step} must not exceed the frame duration {frame}")]
    StepTooCoarse {
        /// Configured time step.
        step: f64,
        /// Configured frame duration.
        frame: f64,
    },
    /// Unrecognized protocol mode name.
    #[error("unknown protocol mode: {0}")]
    UnknownMode(String),
    /// Unrecognized execution strategy name.
    #[error("unknown execution strategy: {0}")]
    UnknownStrategy(String),
}

/// A type alias for `Result<T, ConfigError>`.
pub type ConfigResult<T> = Result<T, ConfigError>;
