use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::{AppError, Result};

/// Configuration for database operation retries
#[derive(Debug, Clone)]
pub struct DatabaseRetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for DatabaseRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay_ms: 200,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
        }
    }
}

impl DatabaseRetryConfig {
    fn next_delay(&self, delay: u64) -> u64 {
        let grown = (delay as f64 * self.backoff_multiplier) as u64;
        grown.min(self.max_delay_ms)
    }
}

/// Retry a database operation with exponential backoff
pub async fn retry_database_operation<F, Fut, T>(
    operation: F,
    config: DatabaseRetryConfig,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay = config.initial_delay_ms;
    let mut last_error = AppError::DatabaseError("Operation was never attempted".to_string());

    for attempt in 1..=config.max_retries {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempt, "database operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) => {
                last_error = e;
                if attempt < config.max_retries {
                    tracing::warn!(attempt, delay_ms = delay, error = %last_error, "database operation failed, retrying");
                    sleep(Duration::from_millis(delay)).await;
                    delay = config.next_delay(delay);
                }
            }
        }
    }

    tracing::error!(attempts = config.max_retries, error = %last_error, "database operation failed");
    Err(last_error)
}

/// Convenience function for operations that might need retrying
pub async fn with_database_retry<F, Fut, T>(operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_database_operation(operation, DatabaseRetryConfig::default()).await
}
