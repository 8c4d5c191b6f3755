//! Discrete-event simulator for Pure and Slotted ALOHA.
//!
//! Stations generate Poisson traffic, contend for a single shared channel,
//! and retry collided frames with binary exponential backoff. A run produces
//! throughput figures that can be set against `S = G·e^(-2G)` (Pure) and
//! `S = G·e^(-G)` (Slotted).
//!
//! ```no_run
//! use aloha_sim::{simulate, Mode, SimConfig, Strategy};
//!
//! let config = SimConfig::builder()
//!     .mode(Mode::Slotted)
//!     .strategy(Strategy::EventDriven)
//!     .offered_load(1.0)
//!     .build()?;
//! let result = simulate(&config)?;
//! println!("S = {:.4} (theory {:.4})", result.simulated_throughput, result.theoretical_throughput);
//! # Ok::<(), aloha_sim::ConfigError>(())
//! ```

pub mod channel;
pub mod config;
pub mod driver;
pub mod error;
pub mod node;
pub mod scheduler;
pub mod theoretical;

pub use channel::{Channel, ChannelStats, Outcome};
pub use config::{Mode, SimConfig, SimConfigBuilder, Strategy};
pub use driver::{run, simulate, Contention, Driver, EventDriven, TimeDriven};
pub use error::{ConfigError, ConfigResult};
pub use node::Node;
pub use theoretical::{RunResult, RunStats};
