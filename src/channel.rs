//! Shared-medium collision arbiter.
//!
//! The channel only counts what it is offered. Deciding when a contention
//! window is over belongs to the driver.

use serde::Serialize;

/// Outcome of resolving one contention window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing was offered.
    Idle,
    /// Exactly one station transmitted.
    Success(usize),
    /// Two or more stations transmitted; every frame is lost. Ids are in
    /// offer order.
    Collision(Vec<usize>),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_collision(&self) -> bool {
        matches!(self, Outcome::Collision(_))
    }

    pub fn winner(&self) -> Option<usize> {
        match self {
            Outcome::Success(id) => Some(*id),
            _ => None,
        }
    }

    /// Stations that lost their frame in this window.
    pub fn involved(&self) -> &[usize] {
        match self {
            Outcome::Collision(ids) => ids,
            _ => &[],
        }
    }
}

/// Lifetime counters of a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelStats {
    pub attempts: u64,
    pub successes: u64,
    pub collisions: u64,
}

impl ChannelStats {
    /// Successes per attempt. Zero when nothing was attempted.
    pub fn efficiency(&self) -> f64 {
        crate::theoretical::efficiency(self.successes, self.attempts)
    }
}

#[derive(Debug, Default)]
pub struct Channel {
    pending_transmissions: Vec<usize>,
    stats: ChannelStats,
}

impl Channel {
    pub fn new() -> Channel {
        Channel::default()
    }

    pub fn offer(&mut self, station_id: usize) {
        self.pending_transmissions.push(station_id);
        self.stats.attempts += 1;
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_transmissions.is_empty()
    }

    pub fn pending(&self) -> &[usize] {
        &self.pending_transmissions
    }

    /// Classify the pending set by its size and clear it.
    pub fn resolve(&mut self) -> Outcome {
        let pending = std::mem::take(&mut self.pending_transmissions);
        match pending.len() {
            0 => Outcome::Idle,
            1 => {
                self.stats.successes += 1;
                Outcome::Success(pending[0])
            }
            _ => {
                self.stats.collisions += 1;
                Outcome::Collision(pending)
            }
        }
    }

    pub fn snapshot_stats(&self) -> ChannelStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_resolution_changes_nothing() {
        let mut channel = Channel::new();
        assert_eq!(channel.resolve(), Outcome::Idle);
        assert_eq!(channel.snapshot_stats(), ChannelStats::default());
        assert!(!channel.has_pending());
    }

    #[test]
    fn single_offer_succeeds() {
        let mut channel = Channel::new();
        channel.offer(4);
        let outcome = channel.resolve();
        assert_eq!(outcome, Outcome::Success(4));
        assert_eq!(outcome.winner(), Some(4));
        assert!(outcome.involved().is_empty());
        let stats = channel.snapshot_stats();
        assert_eq!(stats.successes, 1);
        assert_eq!(stats.collisions, 0);
        assert_eq!(stats.attempts, 1);
    }

    #[test]
    fn multiple_offers_collide_in_offer_order() {
        let mut channel = Channel::new();
        for id in [7, 2, 9] {
            channel.offer(id);
        }
        assert_eq!(channel.pending(), &[7, 2, 9]);
        let outcome = channel.resolve();
        assert!(outcome.is_collision());
        assert_eq!(outcome.involved(), &[7, 2, 9]);
        assert_eq!(outcome.winner(), None);
        let stats = channel.snapshot_stats();
        assert_eq!(stats.collisions, 1);
        assert_eq!(stats.successes, 0);
    }

    #[test]
    fn attempts_track_offers_and_pending_clears() {
        let mut channel = Channel::new();
        let rounds: [&[usize]; 5] = [&[], &[1], &[1, 2], &[3, 4, 5, 6], &[0]];
        for offers in rounds {
            let before = channel.snapshot_stats();
            for &id in offers {
                channel.offer(id);
            }
            let outcome = channel.resolve();
            let after = channel.snapshot_stats();
            assert_eq!(after.attempts, before.attempts + offers.len() as u64);
            assert!(!channel.has_pending());
            match offers.len() {
                0 => assert_eq!(outcome, Outcome::Idle),
                1 => assert_eq!(after.collisions, before.collisions),
                _ => assert_eq!(after.successes, before.successes),
            }
        }
        let stats = channel.snapshot_stats();
        assert_eq!(stats.attempts, 8);
        assert_eq!(stats.successes, 2);
        assert_eq!(stats.collisions, 2);
        assert!((stats.efficiency() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn efficiency_of_empty_channel_is_zero() {
        assert_eq!(Channel::new().snapshot_stats().efficiency(), 0.0);
    }
}
