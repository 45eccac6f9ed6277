pub mod collector;
pub mod config;
pub mod controller;
pub mod error;
pub mod executor;
pub mod host;
pub mod logging;
pub mod monitor;
pub mod notifier;
pub mod policy;
pub mod sampler;
pub mod units;
pub mod window;
