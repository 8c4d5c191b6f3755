//! Run configuration.
//!
//! A [`SimConfig`] is built once through [`SimConfigBuilder`], validated, and
//! then handed by value to a driver. Nothing mutates it during a run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Frame size of the reference setup, in bits.
pub const DEFAULT_FRAME_BITS: f64 = 200.0;
/// Channel capacity of the reference setup, in bits per second.
pub const DEFAULT_CHANNEL_BPS: f64 = 200_000.0;
/// Largest accepted backoff exponent. `2^30` slots is already far past any
/// useful horizon.
pub const MAX_BACKOFF_LIMIT: u32 = 30;

/// ALOHA variant.
#[derive(Debug, Hash, Eq, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Transmit as soon as a packet is ready.
    Pure,
    /// Transmit only on slot boundaries.
    Slotted,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Pure => write!(f, "PURE"),
            Mode::Slotted => write!(f, "SLOTTED"),
        }
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PURE" => Ok(Mode::Pure),
            "SLOTTED" => Ok(Mode::Slotted),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

/// How simulated time is advanced.
#[derive(Debug, Hash, Eq, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Fixed-step polling of every station.
    TimeDriven,
    /// Jump from event to event through a priority queue.
    EventDriven,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::TimeDriven => write!(f, "TIME_DRIVEN"),
            Strategy::EventDriven => write!(f, "EVENT_DRIVEN"),
        }
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "TIME_DRIVEN" => Ok(Strategy::TimeDriven),
            "EVENT_DRIVEN" => Ok(Strategy::EventDriven),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Immutable, validated simulation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    mode: Mode,
    strategy: Strategy,
    offered_load: f64,
    num_stations: usize,
    frame_duration: f64,
    horizon: f64,
    max_backoff: u32,
    time_step: f64,
    seed: u64,
}

impl SimConfig {
    /// Start a builder populated with the reference defaults.
    pub fn builder() -> SimConfigBuilder {
        SimConfigBuilder::new()
    }

    /// Time to push `frame_bits` through a channel of `channel_bps`.
    pub fn frame_duration_for(frame_bits: f64, channel_bps: f64) -> f64 {
        frame_bits / channel_bps
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Offered load `G`, in attempts per frame duration.
    pub fn offered_load(&self) -> f64 {
        self.offered_load
    }

    pub fn num_stations(&self) -> usize {
        self.num_stations
    }

    pub fn frame_duration(&self) -> f64 {
        self.frame_duration
    }

    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    pub fn max_backoff(&self) -> u32 {
        self.max_backoff
    }

    /// Step length of the time-driven strategy.
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Poisson intensity of a single station, in packets per unit time.
    pub fn station_arrival_rate(&self) -> f64 {
        self.offered_load / (self.num_stations as f64 * self.frame_duration)
    }

    /// Horizon expressed in frame durations.
    pub fn horizon_in_frames(&self) -> f64 {
        self.horizon / self.frame_duration
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        let frame_duration = SimConfig::frame_duration_for(DEFAULT_FRAME_BITS, DEFAULT_CHANNEL_BPS);
        Self {
            mode: Mode::Pure,
            strategy: Strategy::EventDriven,
            offered_load: 1.0,
            num_stations: 50,
            frame_duration,
            horizon: 1000.0,
            max_backoff: 15,
            time_step: frame_duration / 10.0,
            seed: 0,
        }
    }
}

/// Builder for [`SimConfig`]. Validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct SimConfigBuilder {
    config: SimConfig,
    time_step: Option<f64>,
}

impl Default for SimConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SimConfig::default(),
            time_step: None,
        }
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    pub fn offered_load(mut self, load: f64) -> Self {
        self.config.offered_load = load;
        self
    }

    pub fn num_stations(mut self, stations: usize) -> Self {
        self.config.num_stations = stations;
        self
    }

    pub fn frame_duration(mut self, frame_duration: f64) -> Self {
        self.config.frame_duration = frame_duration;
        self
    }

    pub fn horizon(mut self, horizon: f64) -> Self {
        self.config.horizon = horizon;
        self
    }

    pub fn max_backoff(mut self, max_backoff: u32) -> Self {
        self.config.max_backoff = max_backoff;
        self
    }

    /// Set the time-driven step. When left unset it follows the frame
    /// duration at one tenth of a frame.
    pub fn time_step(mut self, step: f64) -> Self {
        self.time_step = Some(step);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Validate every field and freeze the configuration.
    pub fn build(self) -> ConfigResult<SimConfig> {
        let mut config = self.config;

        require_positive("offered load", config.offered_load)?;
        require_positive("frame duration", config.frame_duration)?;
        require_positive("horizon", config.horizon)?;
        if config.num_stations == 0 {
            return Err(ConfigError::NoStations);
        }
        if config.max_backoff > MAX_BACKOFF_LIMIT {
            return Err(ConfigError::BackoffTooLarge {
                value: config.max_backoff,
                max: MAX_BACKOFF_LIMIT,
            });
        }

        config.time_step = self.time_step.unwrap_or(config.frame_duration / 10.0);
        require_positive("time step", config.time_step)?;
        if config.time_step > config.frame_duration {
            return Err(ConfigError::StepTooCoarse {
                step: config.time_step,
                frame: config.frame_duration,
            });
        }

        Ok(config)
    }
}

fn require_positive(field: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}
