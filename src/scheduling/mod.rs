pub mod trading_window;
