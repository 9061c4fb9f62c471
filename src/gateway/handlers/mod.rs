//! HTTP handlers
//!
//! - [`health`]: liveness report
//! - [`config`]: client-visible configuration
//! - [`balance`]: account balance lookup

pub mod balance;
pub mod config;
pub mod health;

pub use balance::get_balance;
pub use config::get_config;
pub use health::health_check;
