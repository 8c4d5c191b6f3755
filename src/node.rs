use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp};

use crate::config::{Mode, SimConfig};
use crate::error::{ConfigError, ConfigResult};

/// Instants closer than this (in slots) to a boundary are treated as lying on it.
const SLOT_SNAP: f64 = 1e-9;

#[derive(Debug, Hash, Eq, Clone, Copy, PartialEq)]
pub enum NodeState {
    /// No packet held, waiting for the next arrival.
    Idle,
    /// Holding a packet, waiting for its transmission time.
    Backlogged,
    /// Packet offered to the channel, outcome pending.
    InTx,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Idle => write!(f, "Idle"),
            NodeState::Backlogged => write!(f, "Backlogged"),
            NodeState::InTx => write!(f, "In Tx"),
        }
    }
}

/// First slot boundary at or after `time`.
pub fn next_slot_boundary(time: f64, slot_duration: f64) -> f64 {
    let index = time / slot_duration;
    let nearest = index.round();
    let slot = if (index - nearest).abs() < SLOT_SNAP {
        nearest
    } else {
        index.ceil()
    };
    slot * slot_duration
}

/// A station holding at most one packet, with Poisson arrivals and binary
/// exponential backoff.
#[derive(Debug, Clone)]
pub struct Node {
    id: usize,
    mode: Mode,
    slot_duration: f64,
    max_backoff: u32,
    arrival_rate: f64,
    interarrival: Exp<f64>,
    arrival_rng: ChaCha8Rng,
    backoff_rng: ChaCha8Rng,
    state: NodeState,
    next_arrival_time: f64,
    next_transmission_time: f64,
    backoff_counter: u32,
    packet_born_at: f64,
}

impl Node {
    /// Create station `id`. Arrival and backoff draw from two separate
    /// streams of the run seed, so the arrival sequence of a station does not
    /// depend on how often it collides.
    pub fn new(id: usize, config: &SimConfig) -> ConfigResult<Node> {
        let arrival_rate = config.station_arrival_rate();
        let interarrival = match Exp::new(arrival_rate) {
            Ok(exp) if arrival_rate.is_finite() && arrival_rate > 0.0 => exp,
            _ => {
                return Err(ConfigError::NonPositive {
                    field: "station arrival rate",
                    value: arrival_rate,
                })
            }
        };

        let mut arrival_rng = ChaCha8Rng::seed_from_u64(config.seed());
        arrival_rng.set_stream(2 * id as u64);
        let mut backoff_rng = ChaCha8Rng::seed_from_u64(config.seed());
        backoff_rng.set_stream(2 * id as u64 + 1);

        let first_arrival = interarrival.sample(&mut arrival_rng);

        Ok(Node {
            id,
            mode: config.mode(),
            slot_duration: config.frame_duration(),
            max_backoff: config.max_backoff(),
            arrival_rate,
            interarrival,
            arrival_rng,
            backoff_rng,
            state: NodeState::Idle,
            next_arrival_time: first_arrival,
            next_transmission_time: first_arrival,
            backoff_counter: 0,
            packet_born_at: first_arrival,
        })
    }

    pub fn get_id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn arrival_rate(&self) -> f64 {
        self.arrival_rate
    }

    pub fn has_packet(&self) -> bool {
        self.state != NodeState::Idle
    }

    pub fn next_arrival_time(&self) -> f64 {
        self.next_arrival_time
    }

    /// Only meaningful while [`has_packet`](Self::has_packet) is true.
    pub fn next_transmission_time(&self) -> f64 {
        self.next_transmission_time
    }

    pub fn backoff_counter(&self) -> u32 {
        self.backoff_counter
    }

    /// Arrival instant of the packet currently held.
    pub fn packet_born_at(&self) -> Option<f64> {
        self.has_packet().then_some(self.packet_born_at)
    }

    /// Generate a packet if the station is idle and its arrival is due.
    /// Returns whether a transmission is due now.
    pub fn advance_arrival(&mut self, current_time: f64) -> bool {
        if self.state == NodeState::Idle && current_time >= self.next_arrival_time {
            self.state = NodeState::Backlogged;
            self.packet_born_at = current_time;
            self.next_arrival_time =
                current_time + self.interarrival.sample(&mut self.arrival_rng);
            self.next_transmission_time = match self.mode {
                Mode::Pure => current_time,
                Mode::Slotted => next_slot_boundary(current_time, self.slot_duration),
            };
        }
        self.is_ready(current_time)
    }

    pub fn is_ready(&self, current_time: f64) -> bool {
        self.state == NodeState::Backlogged && current_time >= self.next_transmission_time
    }

    /// Put the held packet in the air. The packet stays with the station
    /// until the channel reports an outcome, so it cannot be offered twice.
    pub fn transmit(&mut self) -> usize {
        if self.state != NodeState::Backlogged {
            tracing::warn!(node = self.id, state = %self.state, "transmit without a backlogged packet");
        }
        self.state = NodeState::InTx;
        self.id
    }

    pub fn on_success(&mut self) {
        self.state = NodeState::Idle;
        self.backoff_counter = 0;
    }

    /// Schedule a retry after a collision. Returns the number of backoff
    /// slots drawn.
    pub fn on_collision(&mut self, current_time: f64) -> u64 {
        self.backoff_counter = (self.backoff_counter + 1).min(self.max_backoff);
        let window = (1u64 << self.backoff_counter) - 1;
        let slots = self.backoff_rng.gen_range(0..=window);

        let retry_at = current_time + slots as f64 * self.slot_duration;
        self.next_transmission_time = match self.mode {
            Mode::Pure => retry_at,
            Mode::Slotted => next_slot_boundary(retry_at, self.slot_duration),
        };
        self.state = NodeState::Backlogged;
        slots
    }
}
