//! # Checkout Cooldown
//!
//! Remembers when each user last passed checkout and refuses another
//! checkout until the window has elapsed. Checked lazily, no background sweep.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;

use crate::UserId;

/// Minimum wait between two checkouts of the same user
pub const CHECKOUT_COOLDOWN: Duration = Duration::from_secs(600);

/// Wall-clock source, replaceable in tests
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug)]
pub struct CooldownTracker {
    window: Duration,
    last_checkout: DashMap<UserId, DateTime<Utc>>,
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new(CHECKOUT_COOLDOWN)
    }
}

impl CooldownTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_checkout: DashMap::new(),
        }
    }

    /// Time left before `user` may check out again, if any
    pub fn remaining(&self, user: UserId, now: DateTime<Utc>) -> Option<Duration> {
        let last = *self.last_checkout.get(&user)?;
        let elapsed = (now - last).to_std().unwrap_or(Duration::ZERO);
        self.window.checked_sub(elapsed).filter(|left| !left.is_zero())
    }

    pub fn record(&self, user: UserId, at: DateTime<Utc>) {
        self.last_checkout.insert(user, at);
    }

    /// Withdraw a stamp whose checkout never reached an administrator
    pub fn withdraw(&self, user: UserId, at: DateTime<Utc>) {
        self.last_checkout.remove_if(&user, |_, stamped| *stamped == at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window() {
        let tracker = CooldownTracker::default();
        let user = UserId(7);
        let t0 = Utc::now();

        assert_eq!(tracker.remaining(user, t0), None);

        tracker.record(user, t0);
        let later = t0 + chrono::Duration::seconds(599);
        assert_eq!(tracker.remaining(user, later), Some(Duration::from_secs(1)));

        let expired = t0 + chrono::Duration::seconds(600);
        assert_eq!(tracker.remaining(user, expired), None);

        assert_eq!(tracker.remaining(UserId(8), later), None);
    }

    #[test]
    fn test_withdraw_only_matching_stamp() {
        let tracker = CooldownTracker::default();
        let user = UserId(7);
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::seconds(5);

        tracker.record(user, t1);
        tracker.withdraw(user, t0);
        assert!(tracker.remaining(user, t1).is_some());

        tracker.withdraw(user, t1);
        assert!(tracker.remaining(user, t1).is_none());
    }
}
