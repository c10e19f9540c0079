use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub stack_api_key: Option<String>,
    pub management_token: Option<String>,
    pub cma_base_url: String,
    pub app_base_url: String,
    pub host: String,
    pub port: u16,
    pub stats_max_concurrency: usize,
    pub frontend_url: String,
}

impl AppConfig {
    /// Default cap on in-flight entry-count requests.
    pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

    /// Every key has a default, so loading never fails.
    pub fn from_env() -> Self {
        Self {
            stack_api_key: optional_var("STACK_API_KEY"),
            management_token: optional_var("MANAGEMENT_TOKEN"),
            cma_base_url: env::var("CMA_BASE_URL")
                .unwrap_or_else(|_| "https://api.contentstack.io".to_string()),
            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "https://app.contentstack.com".to_string()),
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("BACKEND_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            stats_max_concurrency: env::var("STATS_MAX_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(Self::DEFAULT_MAX_CONCURRENCY)
                .max(1),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        }
    }
}

/// Read an env var, treating unset and blank values alike.
fn optional_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optional_var_is_absent() {
        env::set_var("STACKSTATS_TEST_BLANK", "   ");
        assert_eq!(optional_var("STACKSTATS_TEST_BLANK"), None);
        env::remove_var("STACKSTATS_TEST_BLANK");
    }

    #[test]
    fn optional_var_is_trimmed() {
        env::set_var("STACKSTATS_TEST_KEY", " blt123 ");
        assert_eq!(
            optional_var("STACKSTATS_TEST_KEY"),
            Some("blt123".to_string())
        );
        env::remove_var("STACKSTATS_TEST_KEY");
    }
}
