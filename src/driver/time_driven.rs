use crate::config::{Mode, SimConfig};
use crate::error::ConfigResult;

use super::{Contention, Driver};

/// Fixed-step polling of every station in ascending id order.
///
/// Pure mode checks for a finished window on every step. Slotted mode
/// resolves on every slot boundary, and its step is rounded so that a whole
/// number of steps fits in one slot.
#[derive(Debug)]
pub struct TimeDriven {
    config: SimConfig,
    contention: Contention,
    step: u64,
    steps_per_slot: u64,
}

impl TimeDriven {
    pub fn new(config: SimConfig) -> ConfigResult<TimeDriven> {
        let contention = Contention::new(&config)?;
        let steps_per_slot = ((config.frame_duration() / config.time_step()).round() as u64).max(1);
        Ok(TimeDriven {
            config,
            contention,
            step: 0,
            steps_per_slot,
        })
    }

    pub fn steps_per_slot(&self) -> u64 {
        self.steps_per_slot
    }

    /// Simulated time of `step`. Computed from the step index rather than
    /// accumulated, and pinned to exact slot multiples in slotted mode so
    /// boundaries compare equal to slot-aligned transmission times.
    fn clock(&self, step: u64) -> f64 {
        match self.config.mode() {
            Mode::Pure => step as f64 * self.config.time_step(),
            Mode::Slotted => {
                let frame = self.config.frame_duration();
                let slot = step / self.steps_per_slot;
                let sub = step % self.steps_per_slot;
                slot as f64 * frame + sub as f64 * (frame / self.steps_per_slot as f64)
            }
        }
    }

    fn tick(&mut self, now: f64) {
        match self.config.mode() {
            Mode::Pure => {
                if self.contention.window_closed(now) {
                    self.contention.resolve(now);
                }
            }
            Mode::Slotted => {
                if self.step % self.steps_per_slot == 0 {
                    self.contention.resolve(now);
                }
            }
        }

        for id in 0..self.contention.stations().len() {
            if self.contention.station_mut(id).advance_arrival(now) {
                self.contention.offer(id, now);
            }
        }
    }
}

impl Driver for TimeDriven {
    fn config(&self) -> &SimConfig {
        &self.config
    }

    fn contention(&self) -> &Contention {
        &self.contention
    }

    fn iterations(&self) -> u64 {
        self.step
    }

    fn run_to_horizon(&mut self) {
        let horizon = self.config.horizon();
        loop {
            let now = self.clock(self.step);
            if now >= horizon {
                break;
            }
            self.tick(now);
            self.step += 1;
        }
    }
}
