pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod source;
pub mod throttle;
pub mod time;
pub mod traffic;
