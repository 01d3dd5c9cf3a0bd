use anyhow::Result;
use async_trait::async_trait;

use crate::types::quote::Quote;

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSample {
    pub symbol: String,
    pub quote: Quote,
}

/// Anything that can report the latest quote for a set of symbols.
///
/// An `Err` means the whole pass failed; symbols the feed simply has no quote
/// for are left out of the returned samples.
#[async_trait]
pub trait QuoteFeed: Send + Sync {
    async fn sample(&self, symbols: &[String]) -> Result<Vec<QuoteSample>>;
}
