use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::alerting::alert_state::{AlertEvent, AlertState, step_with_age};
use crate::alerting::effect_sink::AlertNotice;
use crate::market::quote_board::QuoteSnapshot;
use crate::scheduling::trading_window::is_instrument_open;
use crate::types::instrument::Instrument;
use crate::types::quote::Quote;

/// What one tick concluded for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentStatus {
    pub symbol: String,
    pub digits: u32,
    pub quote: Quote,
    pub age: Duration,
    pub tradeable: bool,
    pub enabled: bool,
    /// Level view for display: enabled, open and past tolerance right now.
    pub alerting: bool,
    pub state: AlertState,
    pub event: Option<AlertEvent>,
}

impl fmt::Display for InstrumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} bid={} ask={} age={}s {} alert={}",
            self.symbol,
            self.quote.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.quote.bid.with_digits(self.digits),
            self.quote.ask.with_digits(self.digits),
            self.age.as_secs(),
            if self.tradeable { "open" } else { "closed" },
            if self.alerting { "on" } else { "off" },
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub statuses: Vec<InstrumentStatus>,
    pub notices: Vec<AlertNotice>,
}

/// Per-instrument hysteresis, keyed by symbol.
#[derive(Debug, Default)]
pub struct StalenessAlertEngine {
    states: HashMap<String, AlertState>,
}

impl StalenessAlertEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, symbol: &str) -> AlertState {
        self.states.get(symbol).copied().unwrap_or_default()
    }

    pub fn evaluate(&mut self, now: DateTime<Tz>, instrument: &Instrument, quote: &Quote) -> InstrumentStatus {
        let age = quote.age_at(now);
        let tradeable = is_instrument_open(now, instrument);
        let enabled = instrument.is_enabled();

        let prior = self.state(instrument.symbol());
        let transition = step_with_age(age, instrument.tolerance(), tradeable, enabled, prior);
        self.states.insert(instrument.symbol().to_string(), transition.state);

        InstrumentStatus {
            symbol: instrument.symbol().to_string(),
            digits: instrument.digits(),
            quote: *quote,
            age,
            tradeable,
            enabled,
            alerting: enabled && tradeable && age > instrument.tolerance(),
            state: transition.state,
            event: transition.event,
        }
    }

    /// Instruments without a quote in `snapshot` are skipped and keep their state.
    pub fn tick(&mut self, now: DateTime<Tz>, instruments: &[Instrument], snapshot: &QuoteSnapshot) -> TickReport {
        let mut report = TickReport::default();

        for instrument in instruments {
            let Some(quote) = snapshot.get(instrument.symbol()) else {
                continue;
            };

            let status = self.evaluate(now, instrument, quote);
            if let Some(event) = status.event {
                let sound = match event {
                    AlertEvent::Stopped => instrument.stop_sound(),
                    AlertEvent::Resumed => instrument.resume_sound(),
                };

                report.notices.push(AlertNotice {
                    symbol: status.symbol.clone(),
                    event,
                    at: now,
                    sound: sound.map(|path| path.to_path_buf()),
                });
            }
            report.statuses.push(status);
        }

        report
    }

    /// Drops state for instruments no longer in the registry.
    pub fn retain_instruments(&mut self, instruments: &[Instrument]) {
        self.states
            .retain(|symbol, _| instruments.iter().any(|instrument| instrument.symbol() == symbol));
    }

    pub fn reset(&mut self) {
        self.states.clear();
    }
}
