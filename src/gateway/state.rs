use std::sync::Arc;
use std::time::Instant;

use crate::balance::BalanceService;
use crate::config::AppConfig;

/// Shared gateway state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub balances: Arc<BalanceService>,
    /// Process start, for the uptime report
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, balances: Arc<BalanceService>) -> Self {
        Self {
            config,
            balances,
            started_at: Instant::now(),
        }
    }

    /// Seconds since start, fractional
    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
