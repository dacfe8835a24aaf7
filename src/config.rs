use std::env;
use std::path::PathBuf;

/// Marker left in sample configuration files in place of a real project endpoint.
pub const PLACEHOLDER_ENDPOINT: &str = "YOUR-PROJECT-REF";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub remote_database_url: Option<String>,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub verification_pass_rate: f64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));
        let remote_database_url = env::var("REMOTE_DATABASE_URL")
            .ok()
            .filter(|url| is_configured_endpoint(url));
        let jwt_secret = env::var("JWT_SECRET")?;
        let session_ttl_hours = env::var("SESSION_TTL_HOURS")
            .ok()
            .and_then(|h| h.parse::<i64>().ok())
            .unwrap_or(24);
        let verification_pass_rate = env::var("VERIFICATION_PASS_RATE")
            .ok()
            .and_then(|r| r.parse::<f64>().ok())
            .map(|r| r.clamp(0.0, 1.0))
            .unwrap_or(0.9);
        Ok(Self {
            host,
            port,
            data_dir,
            remote_database_url,
            jwt_secret,
            session_ttl_hours,
            verification_pass_rate,
        })
    }
}

/// An endpoint counts as configured when it is non-empty and not the sample placeholder.
pub fn is_configured_endpoint(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty() && !url.contains(PLACEHOLDER_ENDPOINT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_endpoints_are_not_configured() {
        assert!(!is_configured_endpoint(""));
        assert!(!is_configured_endpoint("   "));
        assert!(!is_configured_endpoint(
            "postgres://user:pw@db.YOUR-PROJECT-REF.example.co/postgres"
        ));
        assert!(is_configured_endpoint("postgres://user:pw@localhost/shop"));
    }
}
