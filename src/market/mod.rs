pub mod bridge_feed;
pub mod market_source;
pub mod quote_board;
pub mod quote_producer;
pub mod snapshot_feed;
pub mod snapshot_file;
