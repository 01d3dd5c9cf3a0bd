pub mod config_store;
pub mod monitor_config;
pub mod product_list;
pub mod schedule_parameters;
pub mod sessions;
