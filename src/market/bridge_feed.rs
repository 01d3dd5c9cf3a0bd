use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::TimeZone;
use chrono_tz::Tz;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info};

use crate::market::market_source::{QuoteFeed, QuoteSample};
use crate::types::price::Price;
use crate::types::quote::Quote;

const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Latest tick per symbol as pushed by a terminal bridge over a websocket.
///
/// Expected messages are `{"symbol": "XAUUSD", "bid": 2350.1, "ask": 2350.4,
/// "time": 1741053600}` with `time` in epoch seconds, or an array of them.
pub struct BridgeFeed {
    latest: Arc<Mutex<HashMap<String, Quote>>>,
    wanted: watch::Sender<Vec<String>>,
    connection: JoinHandle<()>,
}

#[derive(Debug, Deserialize)]
struct BridgeTick {
    symbol: String,
    bid: f64,
    ask: f64,
    time: i64,
}

impl BridgeFeed {
    /// Must be called inside a tokio runtime; the connection task is
    /// aborted when the feed is dropped.
    pub fn spawn(websocket_url: impl Into<String>, tz: Tz) -> Self {
        let websocket_url = websocket_url.into();
        let latest = Arc::new(Mutex::new(HashMap::new()));
        let (wanted, wanted_rx) = watch::channel(Vec::new());

        let connection = tokio::spawn({
            let latest = Arc::clone(&latest);
            async move {
                loop {
                    let mut wanted = wanted_rx.clone();
                    if let Err(error) = Self::run_connection(&websocket_url, tz, &latest, &mut wanted).await {
                        error!("quote bridge stopped with error: {error:?}");
                    }

                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        });

        Self {
            latest,
            wanted,
            connection,
        }
    }

    fn subscription(symbols: &[String]) -> Value {
        json!({
            "event": "subscribe",
            "symbols": symbols,
        })
    }

    async fn run_connection(
        websocket_url: &str,
        tz: Tz,
        latest: &Mutex<HashMap<String, Quote>>,
        wanted: &mut watch::Receiver<Vec<String>>,
    ) -> Result<()> {
        let (stream, _http_response) = connect_async(websocket_url).await?;
        let (mut writer, mut reader) = stream.split();

        let symbols = wanted.borrow_and_update().clone();
        writer.send(Message::Text(Self::subscription(&symbols).to_string())).await?;

        info!(url = websocket_url, symbols = symbols.len(), "quote bridge connected");

        loop {
            let message = tokio::select! {
                message = reader.next() => message,
                changed = wanted.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let symbols = wanted.borrow_and_update().clone();
                    debug!(symbols = symbols.len(), "re-subscribing quote bridge");
                    writer.send(Message::Text(Self::subscription(&symbols).to_string())).await?;
                    continue;
                }
            };
            let Some(message) = message else {
                break;
            };

            let message_text: Option<String> = match message? {
                Message::Text(text) => Some(text),
                Message::Binary(binary) => String::from_utf8(binary).ok(),
                Message::Ping(_) | Message::Pong(_) => None,
                Message::Close(frame) => {
                    error!("quote bridge closed: {:?}", frame);
                    break;
                }
                _ => None,
            };

            if let Some(text) = message_text {
                let ticks = Self::parse_ticks(&text, tz);
                if ticks.is_empty() {
                    debug!(%text, "ignoring bridge message");
                    continue;
                }

                let mut latest = latest.lock();
                for (symbol, quote) in ticks {
                    latest.insert(symbol, quote);
                }
            }
        }

        Ok(())
    }

    fn parse_ticks(text: &str, tz: Tz) -> Vec<(String, Quote)> {
        let Ok(parsed) = serde_json::from_str::<Value>(text) else {
            return Vec::new();
        };

        let values = match parsed {
            Value::Array(values) => values,
            other => vec![other],
        };

        values
            .into_iter()
            .filter_map(|value| serde_json::from_value::<BridgeTick>(value).ok())
            .filter_map(|tick| Self::to_quote(tick, tz))
            .collect()
    }

    fn to_quote(tick: BridgeTick, tz: Tz) -> Option<(String, Quote)> {
        let timestamp = tz.timestamp_opt(tick.time, 0).single()?;
        let bid = Price::try_new(tick.bid)?;
        let ask = Price::try_new(tick.ask)?;

        Some((tick.symbol.trim().to_string(), Quote::new(bid, ask, timestamp)))
    }
}

impl Drop for BridgeFeed {
    fn drop(&mut self) {
        self.connection.abort();
    }
}

#[async_trait]
impl QuoteFeed for BridgeFeed {
    async fn sample(&self, symbols: &[String]) -> Result<Vec<QuoteSample>> {
        self.wanted.send_if_modified(|wanted| {
            if wanted.as_slice() == symbols {
                return false;
            }
            *wanted = symbols.to_vec();
            true
        });

        let latest = self.latest.lock();
        Ok(symbols
            .iter()
            .filter_map(|symbol| {
                latest.get(symbol).map(|quote| QuoteSample {
                    symbol: symbol.clone(),
                    quote: *quote,
                })
            })
            .collect())
    }
}
