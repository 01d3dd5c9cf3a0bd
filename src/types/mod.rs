pub mod instrument;
pub mod price;
pub mod quote;
pub mod schedule;
pub mod time_of_day;
pub mod trading_day;
