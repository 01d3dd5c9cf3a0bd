pub mod feeds;
pub mod scenario;
