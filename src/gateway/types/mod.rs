//! Gateway types module
//!
//! - [`ApiResponse<T>`]: Unified API response wrapper
//! - [`error_codes`]: numeric codes carried in `ApiResponse::code`
//! - DTOs for health, config and balance endpoints

pub mod response;

pub use response::{ApiResponse, BalanceData, HealthResponse, PublicConfig, error_codes};
