pub mod alert_engine;
pub mod alert_state;
pub mod effect_sink;
pub mod play_log;
pub mod sound;
