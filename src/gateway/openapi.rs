//! OpenAPI Documentation
//!
//! Generated OpenAPI 3 document, served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::gateway::types::{ApiResponse, BalanceData, HealthResponse, PublicConfig};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sol Wallet Desk API",
        version = "1.0.0",
        description = "Balance lookups and client configuration for the SOL transfer desk.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::config::get_config,
        crate::gateway::handlers::balance::get_balance,
    ),
    components(
        schemas(
            HealthResponse,
            PublicConfig,
            BalanceData,
            ApiResponse<BalanceData>,
        )
    ),
    tags(
        (name = "Account", description = "Account balance queries"),
        (name = "System", description = "Health checks and configuration")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Sol Wallet Desk API");
        assert_eq!(spec.info.version, "1.0.0");
    }

    #[test]
    fn test_openapi_json_serializable() {
        let json = ApiDoc::openapi().to_json().unwrap();
        assert!(json.contains("Sol Wallet Desk API"));
    }

    #[test]
    fn test_endpoints_registered() {
        let paths = ApiDoc::openapi().paths;
        assert!(paths.paths.contains_key("/api/health"));
        assert!(paths.paths.contains_key("/api/config"));
        assert!(paths.paths.contains_key("/api/balance/{address}"));
    }
}
