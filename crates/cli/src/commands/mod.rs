pub mod config_cmd;
pub mod start;
pub mod tools;
