use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: Option<String>,
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub media_root: PathBuf,
    pub index_cache_seconds: u64,
    pub posts_per_page: u32,
    pub max_upload_bytes: usize,
    pub seed_sample_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 5000,
            database_url: None,
            session_secret: "dev-secret-change-in-production".to_string(),
            session_ttl_hours: 24 * 14,
            media_root: PathBuf::from("media"),
            index_cache_seconds: 20,
            posts_per_page: 10,
            max_upload_bytes: 10 * 1024 * 1024,
            seed_sample_data: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env::var("PORT")
                .or_else(|_| env::var("SERVER_PORT"))
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(defaults.server_port),
            database_url: env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            session_secret: env::var("SESSION_SECRET")
                .or_else(|_| env::var("JWT_SECRET"))
                .unwrap_or(defaults.session_secret),
            session_ttl_hours: parse_var("SESSION_TTL_HOURS").unwrap_or(defaults.session_ttl_hours),
            media_root: env::var("MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.media_root),
            index_cache_seconds: parse_var("INDEX_CACHE_SECONDS")
                .unwrap_or(defaults.index_cache_seconds),
            posts_per_page: parse_var("POSTS_PER_PAGE")
                .filter(|per_page| *per_page > 0)
                .unwrap_or(defaults.posts_per_page),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES").unwrap_or(defaults.max_upload_bytes),
            seed_sample_data: env::var("SEED_SAMPLE_DATA")
                .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(defaults.seed_sample_data),
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn index_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.index_cache_seconds)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.posts_per_page, 10);
        assert_eq!(config.index_cache_ttl(), Duration::from_secs(20));
        assert_eq!(config.server_address(), "0.0.0.0:5000");
        assert!(config.database_url.is_none());
    }
}
