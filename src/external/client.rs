use std::time::Duration;

use crate::error::{AppError, AppResult};

/// User-Agent sent with every outbound request
pub fn user_agent() -> String {
    format!("natsify/{}", crate::pkg_version())
}

/// Build the HTTP client used for push delivery.
///
/// `timeout` bounds each whole request; connecting is bounded by the same
/// value so a dead host fails as fast as a slow one.
pub fn build_http_client(timeout: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        // Timeouts
        .timeout(timeout)
        .connect_timeout(timeout)
        // Connection pooling
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .gzip(true)
        .user_agent(user_agent())
        .build()
        .map_err(|e| AppError::Configuration {
            key: "ntfy".to_string(),
            source: e.into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_initialization() {
        assert!(build_http_client(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_user_agent_carries_version() {
        assert!(user_agent().starts_with("natsify/"));
    }
}
