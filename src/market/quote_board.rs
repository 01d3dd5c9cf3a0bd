use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::types::quote::Quote;

/// One complete feed pass. Never mutated after publication.
#[derive(Clone, Default, PartialEq)]
pub struct QuoteSnapshot {
    quotes: HashMap<String, Quote>,
}

impl QuoteSnapshot {
    pub fn new(quotes: HashMap<String, Quote>) -> Self {
        Self { quotes }
    }

    pub fn get(&self, symbol: &str) -> Option<&Quote> {
        self.quotes.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Quote)> {
        self.quotes.iter().map(|(symbol, quote)| (symbol.as_str(), quote))
    }
}

impl fmt::Debug for QuoteSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuoteSnapshot")
            .field("instruments", &self.quotes.len())
            .finish()
    }
}

/// Single-slot handover between the feed producer and the tick loop.
///
/// Writers swap in a whole new snapshot; readers hold an `Arc` to whichever
/// snapshot was current when they looked, so a reader can never see half of
/// one pass and half of the next.
#[derive(Clone, Default)]
pub struct QuoteBoard {
    current: Arc<RwLock<Arc<QuoteSnapshot>>>,
}

impl QuoteBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, snapshot: QuoteSnapshot) {
        let snapshot = Arc::new(snapshot);
        *self.current.write() = snapshot;
    }

    pub fn current(&self) -> Arc<QuoteSnapshot> {
        Arc::clone(&self.current.read())
    }

    pub fn clear(&self) {
        self.publish(QuoteSnapshot::default());
    }
}

impl fmt::Debug for QuoteBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuoteBoard")
            .field("current", &*self.current.read())
            .finish()
    }
}
