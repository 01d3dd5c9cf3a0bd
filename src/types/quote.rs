use std::time::Duration;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::types::price::Price;

/// Latest top of book for one instrument, stamped in the monitoring timezone.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quote {
    pub bid: Price,
    pub ask: Price,
    pub timestamp: DateTime<Tz>,
}

impl Quote {
    pub fn new(bid: Price, ask: Price, timestamp: DateTime<Tz>) -> Self {
        Self {
            bid,
            ask,
            timestamp,
        }
    }

    /// Never negative: a feed clock running ahead of `now` reads as fresh.
    pub fn age_at(&self, now: DateTime<Tz>) -> Duration {
        now.signed_duration_since(self.timestamp)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}
