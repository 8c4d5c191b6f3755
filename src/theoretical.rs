/*
    Pure ALOHA:    S = G * e^(-2G)   (vulnerable period of two frames)
    Slotted ALOHA: S = G * e^(-G)    (vulnerable period of one slot)
 */

use serde::Serialize;

use crate::config::{Mode, Strategy};

pub fn theoretical_throughput(offered_load: f64, mode: Mode) -> f64 {
    match mode {
        Mode::Pure => offered_load * (-2.0 * offered_load).exp(),
        Mode::Slotted => offered_load * (-offered_load).exp(),
    }
}

/// Share of frame slots over the horizon that carried a successful frame.
/// Returns 0.0 when the horizon or frame duration is not positive.
pub fn normalized_throughput(success_count: u64, horizon: f64, frame_duration: f64) -> f64 {
    if !(horizon > 0.0 && frame_duration > 0.0) {
        return 0.0;
    }
    success_count as f64 / (horizon / frame_duration)
}

/// Convert a normalized throughput to frames per unit time.
pub fn absolute_throughput(throughput: f64, offered_load: f64, frame_duration: f64) -> f64 {
    throughput * (offered_load / frame_duration)
}

/// Successes per attempt, 0.0 by convention when nothing was attempted.
pub fn efficiency(successes: u64, attempts: u64) -> f64 {
    if attempts == 0 {
        return 0.0;
    }
    successes as f64 / attempts as f64
}

/// Mean arrival-to-delivery time. `None` when no packet was delivered,
/// since the mean is undefined there.
pub fn mean_delay(total_delay: f64, deliveries: u64) -> Option<f64> {
    (deliveries > 0).then(|| total_delay / deliveries as f64)
}

/// Offered load at which the theoretical curve peaks.
pub fn optimal_load(mode: Mode) -> f64 {
    match mode {
        Mode::Pure => 0.5,
        Mode::Slotted => 1.0,
    }
}

pub fn peak_throughput(mode: Mode) -> f64 {
    theoretical_throughput(optimal_load(mode), mode)
}

/// Raw counts of one finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub mode: Mode,
    pub strategy: Strategy,
    pub offered_load: f64,
    pub horizon: f64,
    pub frame_duration: f64,
    pub attempts: u64,
    pub successes: u64,
    pub collisions: u64,
    /// Sum of arrival-to-delivery times over delivered packets.
    pub total_delay: f64,
    /// Events processed (event-driven) or steps taken (time-driven).
    pub iterations: u64,
}

/// Throughput figures of one run, ready for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub mode: Mode,
    pub strategy: Strategy,
    pub offered_load: f64,
    pub theoretical_throughput: f64,
    pub simulated_throughput: f64,
    pub absolute_throughput: f64,
    pub efficiency: f64,
    pub mean_delay: Option<f64>,
}

impl RunStats {
    pub fn analyze(&self) -> RunResult {
        let simulated = normalized_throughput(self.successes, self.horizon, self.frame_duration);
        RunResult {
            mode: self.mode,
            strategy: self.strategy,
            offered_load: self.offered_load,
            theoretical_throughput: theoretical_throughput(self.offered_load, self.mode),
            simulated_throughput: simulated,
            absolute_throughput: absolute_throughput(
                simulated,
                self.offered_load,
                self.frame_duration,
            ),
            efficiency: efficiency(self.successes, self.attempts),
            mean_delay: mean_delay(self.total_delay, self.successes),
        }
    }
}
