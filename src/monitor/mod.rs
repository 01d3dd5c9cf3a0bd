pub mod clock;
pub mod monitor;
pub mod operator;
