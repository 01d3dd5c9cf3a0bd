use std::fmt;
use std::time::Duration;

use chrono::DateTime;
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertState {
    #[default]
    Idle,
    /// A stop alert has sounded and no resume alert since.
    Fired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertEvent {
    Stopped,
    Resumed,
}

impl fmt::Display for AlertEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Resumed => write!(f, "resumed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: AlertState,
    pub event: Option<AlertEvent>,
}

impl Transition {
    fn hold(state: AlertState) -> Self {
        Self { state, event: None }
    }

    fn to(state: AlertState, event: AlertEvent) -> Self {
        Self {
            state,
            event: Some(event),
        }
    }
}

/// Advances one instrument by one tick.
///
/// Edge triggered: only `Idle -> Fired` and `Fired -> Idle` emit an event.
/// While the instrument is closed or its alert is disabled the prior state is
/// left exactly as it was, so an episode in progress survives a break or a
/// temporary mute.
pub fn step(
    now: DateTime<Tz>,
    quote_timestamp: DateTime<Tz>,
    tolerance: Duration,
    tradeable: bool,
    enabled: bool,
    prior: AlertState,
) -> Transition {
    let age = now
        .signed_duration_since(quote_timestamp)
        .to_std()
        .unwrap_or(Duration::ZERO);

    step_with_age(age, tolerance, tradeable, enabled, prior)
}

pub fn step_with_age(
    age: Duration,
    tolerance: Duration,
    tradeable: bool,
    enabled: bool,
    prior: AlertState,
) -> Transition {
    if !enabled || !tradeable {
        return Transition::hold(prior);
    }

    let stale = age > tolerance;
    match (stale, prior) {
        (true, AlertState::Idle) => Transition::to(AlertState::Fired, AlertEvent::Stopped),
        (true, AlertState::Fired) => Transition::hold(AlertState::Fired),
        (false, AlertState::Fired) => Transition::to(AlertState::Idle, AlertEvent::Resumed),
        (false, AlertState::Idle) => Transition::hold(AlertState::Idle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use chrono_tz::Asia::Shanghai;

    fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }

    fn run(ages: &[u64], tolerance: u64) -> Vec<Option<AlertEvent>> {
        let mut state = AlertState::Idle;
        ages.iter()
            .map(|age| {
                let transition = step_with_age(secs(*age), secs(tolerance), true, true, state);
                state = transition.state;
                transition.event
            })
            .collect()
    }

    #[test]
    fn fires_once_and_resumes_once_per_episode() {
        use AlertEvent::*;

        let events = run(&[1, 2, 10, 11, 12, 3, 2], 5);

        assert_eq!(
            events,
            vec![None, None, Some(Stopped), None, None, Some(Resumed), None]
        );
    }

    #[test]
    fn age_equal_to_tolerance_is_fresh() {
        let fired = step_with_age(secs(5), secs(5), true, true, AlertState::Fired);
        assert_eq!(fired.event, Some(AlertEvent::Resumed));

        let idle = step_with_age(secs(5), secs(5), true, true, AlertState::Idle);
        assert_eq!(idle.event, None);
    }

    #[test]
    fn zero_tolerance_fires_on_any_age() {
        let transition = step_with_age(secs(1), Duration::ZERO, true, true, AlertState::Idle);
        assert_eq!(transition.event, Some(AlertEvent::Stopped));

        let fresh = step_with_age(Duration::ZERO, Duration::ZERO, true, true, AlertState::Idle);
        assert_eq!(fresh.event, None);
    }

    #[test]
    fn closed_market_freezes_the_episode() {
        let mut state = AlertState::Idle;

        let first = step_with_age(secs(10), secs(5), true, true, state);
        assert_eq!(first.event, Some(AlertEvent::Stopped));
        state = first.state;

        /* closed: fresh or stale, nothing moves */
        for age in [10, 1, 0, 30] {
            let closed = step_with_age(secs(age), secs(5), false, true, state);
            assert_eq!(closed.event, None);
            assert_eq!(closed.state, AlertState::Fired);
            state = closed.state;
        }

        let reopened_stale = step_with_age(secs(20), secs(5), true, true, state);
        assert_eq!(reopened_stale.event, None);
        assert_eq!(reopened_stale.state, AlertState::Fired);

        let recovered = step_with_age(secs(1), secs(5), true, true, reopened_stale.state);
        assert_eq!(recovered.event, Some(AlertEvent::Resumed));
    }

    #[test]
    fn disabled_alert_leaves_state_untouched() {
        let fired = step_with_age(secs(0), secs(5), true, false, AlertState::Fired);
        assert_eq!(fired, Transition::hold(AlertState::Fired));

        let idle = step_with_age(secs(60), secs(5), true, false, AlertState::Idle);
        assert_eq!(idle, Transition::hold(AlertState::Idle));
    }

    #[test]
    fn repeated_evaluation_of_the_same_input_is_idempotent() {
        let first = step_with_age(secs(9), secs(5), true, true, AlertState::Idle);
        assert_eq!(first.event, Some(AlertEvent::Stopped));

        let mut state = first.state;
        for _ in 0..5 {
            let again = step_with_age(secs(9), secs(5), true, true, state);
            assert_eq!(again.event, None);
            state = again.state;
        }
    }

    #[test]
    fn stopped_minus_resumed_stays_zero_or_one() {
        let ages = [0, 9, 9, 2, 8, 1, 1, 12, 4, 20, 20, 0];
        let tradeable = [true, true, false, true, true, false, true, true, true, true, false, true];

        let mut state = AlertState::Idle;
        let mut balance: i32 = 0;
        for (age, open) in ages.iter().zip(tradeable) {
            let transition = step_with_age(secs(*age), secs(5), open, true, state);
            match transition.event {
                Some(AlertEvent::Stopped) => balance += 1,
                Some(AlertEvent::Resumed) => balance -= 1,
                None => {}
            }
            assert!(balance == 0 || balance == 1, "balance drifted to {balance}");
            state = transition.state;
        }
    }

    #[test]
    fn feed_clock_ahead_of_now_counts_as_fresh() {
        let now = Shanghai.with_ymd_and_hms(2025, 3, 4, 10, 0, 0).unwrap();
        let future = now + TimeDelta::seconds(30);

        let transition = step(now, future, Duration::ZERO, true, true, AlertState::Fired);
        assert_eq!(transition.event, Some(AlertEvent::Resumed));
    }
}
