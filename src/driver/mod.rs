//! Simulation drivers.
//!
//! Both strategies run the same station/channel state machine through
//! [`Contention`]; they differ only in how simulated time advances.
//!
//! A transmission started at `t` occupies the medium until `t + frame`.
//! Every transmission that starts before the active window ends joins it,
//! and the window is resolved once time reaches its end. In slotted mode
//! transmissions only start on boundaries, so each window is one slot.

mod event_driven;
mod time_driven;

pub use event_driven::EventDriven;
pub use time_driven::TimeDriven;

use crate::channel::{Channel, ChannelStats, Outcome};
use crate::config::{SimConfig, Strategy};
use crate::error::ConfigResult;
use crate::node::Node;
use crate::theoretical::{RunResult, RunStats};

/// Window ends closer than this many frames count as reached.
const WINDOW_SLACK: f64 = 1e-9;

/// Stations plus the channel they share, and the end of the window
/// currently being collected.
#[derive(Debug)]
pub struct Contention {
    stations: Vec<Node>,
    channel: Channel,
    frame_duration: f64,
    window_end: f64,
    total_delay: f64,
}

impl Contention {
    pub fn new(config: &SimConfig) -> ConfigResult<Contention> {
        let stations = (0..config.num_stations())
            .map(|id| Node::new(id, config))
            .collect::<ConfigResult<Vec<_>>>()?;
        Ok(Contention {
            stations,
            channel: Channel::new(),
            frame_duration: config.frame_duration(),
            window_end: 0.0,
            total_delay: 0.0,
        })
    }

    pub fn stations(&self) -> &[Node] {
        &self.stations
    }

    pub fn station_mut(&mut self, id: usize) -> &mut Node {
        &mut self.stations[id]
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn stats(&self) -> ChannelStats {
        self.channel.snapshot_stats()
    }

    /// End of the active window. Meaningless while nothing is pending.
    pub fn window_end(&self) -> f64 {
        self.window_end
    }

    pub fn total_delay(&self) -> f64 {
        self.total_delay
    }

    /// Put station `id` on the medium, starting at `start`.
    pub fn offer(&mut self, id: usize, start: f64) {
        let end = start + self.frame_duration;
        if self.channel.has_pending() {
            self.window_end = self.window_end.max(end);
        } else {
            self.window_end = end;
        }
        let station_id = self.stations[id].transmit();
        self.channel.offer(station_id);
        tracing::trace!(station = station_id, start, window_end = self.window_end, "offer");
    }

    /// Whether the active window has something in it and has run out.
    pub fn window_closed(&self, now: f64) -> bool {
        self.channel.has_pending() && now >= self.window_end - WINDOW_SLACK * self.frame_duration
    }

    /// Resolve the channel at `now` and notify the involved stations.
    pub fn resolve(&mut self, now: f64) -> Outcome {
        let outcome = self.channel.resolve();
        match &outcome {
            Outcome::Idle => {}
            Outcome::Success(id) => {
                let station = &mut self.stations[*id];
                if let Some(born) = station.packet_born_at() {
                    self.total_delay += now - born;
                }
                station.on_success();
                tracing::trace!(station = id, now, "success");
            }
            Outcome::Collision(ids) => {
                for &id in ids {
                    self.stations[id].on_collision(now);
                }
                tracing::debug!(stations = ?ids, now, "collision");
            }
        }
        outcome
    }
}

/// A time-advance discipline over a [`Contention`].
pub trait Driver {
    fn config(&self) -> &SimConfig;

    fn contention(&self) -> &Contention;

    /// Events processed or steps taken so far.
    fn iterations(&self) -> u64;

    /// Advance until the horizon is reached or nothing is left to simulate.
    fn run_to_horizon(&mut self);

    fn stats(&self) -> RunStats {
        let config = self.config();
        let contention = self.contention();
        let channel = contention.stats();
        RunStats {
            mode: config.mode(),
            strategy: config.strategy(),
            offered_load: config.offered_load(),
            horizon: config.horizon(),
            frame_duration: config.frame_duration(),
            attempts: channel.attempts,
            successes: channel.successes,
            collisions: channel.collisions,
            total_delay: contention.total_delay(),
            iterations: self.iterations(),
        }
    }
}

/// Run `config` with its configured strategy and return the raw counts.
pub fn run(config: &SimConfig) -> ConfigResult<RunStats> {
    tracing::info!(
        mode = %config.mode(),
        strategy = %config.strategy(),
        offered_load = config.offered_load(),
        stations = config.num_stations(),
        horizon = config.horizon(),
        seed = config.seed(),
        "starting run"
    );
    let stats = match config.strategy() {
        Strategy::TimeDriven => drive(TimeDriven::new(config.clone())?),
        Strategy::EventDriven => drive(EventDriven::new(config.clone())?),
    };
    tracing::info!(
        successes = stats.successes,
        collisions = stats.collisions,
        attempts = stats.attempts,
        iterations = stats.iterations,
        "run complete"
    );
    Ok(stats)
}

/// Run `config` and analyze the outcome.
pub fn simulate(config: &SimConfig) -> ConfigResult<RunResult> {
    run(config).map(|stats| stats.analyze())
}

fn drive(mut driver: impl Driver) -> RunStats {
    driver.run_to_horizon();
    driver.stats()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use tracing_test::traced_test;

    fn config(mode: Mode, strategy: Strategy) -> SimConfig {
        SimConfig::builder()
            .mode(mode)
            .strategy(strategy)
            .offered_load(0.8)
            .num_stations(8)
            .frame_duration(1.0)
            .horizon(2_000.0)
            .seed(11)
            .build()
            .unwrap()
    }

    fn packet_ready(contention: &mut Contention, id: usize) -> f64 {
        let station = contention.station_mut(id);
        let due = station.next_arrival_time();
        station.advance_arrival(due);
        due
    }

    #[test]
    fn overlapping_offers_share_a_window() {
        let mut contention = Contention::new(&config(Mode::Pure, Strategy::EventDriven)).unwrap();
        packet_ready(&mut contention, 0);
        packet_ready(&mut contention, 1);
        contention.offer(0, 10.0);
        contention.offer(1, 10.5);
        assert_eq!(contention.window_end(), 11.5);
        assert!(!contention.window_closed(11.0));
        assert!(contention.window_closed(11.5));
        let outcome = contention.resolve(11.5);
        assert_eq!(outcome, Outcome::Collision(vec![0, 1]));
        assert_eq!(contention.stations()[0].backoff_counter(), 1);
        assert_eq!(contention.stations()[1].backoff_counter(), 1);
        assert!(!contention.window_closed(100.0));
    }

    #[test]
    fn success_accumulates_delay() {
        let mut contention = Contention::new(&config(Mode::Pure, Strategy::EventDriven)).unwrap();
        let born = packet_ready(&mut contention, 3);
        contention.offer(3, born);
        let end = contention.window_end();
        assert_eq!(contention.resolve(end), Outcome::Success(3));
        assert!((contention.total_delay() - 1.0).abs() < 1e-9);
        assert!(!contention.stations()[3].has_packet());
        assert_eq!(contention.stats().successes, 1);
    }

    #[test]
    fn run_is_reproducible_for_a_seed() {
        for strategy in [Strategy::TimeDriven, Strategy::EventDriven] {
            for mode in [Mode::Pure, Mode::Slotted] {
                let first = run(&config(mode, strategy)).unwrap();
                let second = run(&config(mode, strategy)).unwrap();
                assert_eq!(first, second);
                assert!(first.successes > 0);
                assert!(first.successes + first.collisions <= first.attempts);
            }
        }
    }

    #[test]
    fn simulate_produces_a_record() {
        let result = simulate(&config(Mode::Slotted, Strategy::EventDriven)).unwrap();
        assert_eq!(result.mode, Mode::Slotted);
        assert_eq!(result.strategy, Strategy::EventDriven);
        assert!(result.simulated_throughput > 0.0 && result.simulated_throughput < 1.0);
        assert!(result.mean_delay.is_some());
    }

    #[test]
    #[traced_test]
    fn run_logs_start_and_completion() {
        run(&config(Mode::Pure, Strategy::TimeDriven)).unwrap();
        assert!(logs_contain("starting run"));
        assert!(logs_contain("run complete"));
    }
}
