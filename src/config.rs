use anyhow::{Context, Result};

/// Which hostname goes into externally visible short URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    /// Fixed local form, e.g. "http://localhost:3000/s/<token>".
    Local,
    /// The incoming request's Host header.
    Hosted,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection string, e.g. "sqlite:./hashly.db"
    pub database_url: String,

    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Truncation length for token derivation. A value of N yields tokens of
    /// length clamp(N,1,64) + clamp(N,1,128).
    pub slice_len: usize,

    /// Environment discriminator for short-URL rendering.
    pub env: AppEnv,

    /// Token-bucket capacity per token on the resolve path.
    pub rate_limit_capacity: u32,

    /// Token-bucket refill rate per token, in tokens per second.
    pub rate_limit_refill_per_sec: f64,

    /// How many tokens one store enumeration page may return.
    pub list_page_size: u32,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy
    /// before this is called). Fixed for the process lifetime; no hot-reload.
    pub fn from_env() -> Result<Self> {
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let slice_len = std::env::var("SLICE_LEN")
            .unwrap_or_else(|_| "4".into())
            .parse::<usize>()
            .context("SLICE_LEN must be a non-negative integer")?;

        let env = match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "local".into())
            .to_ascii_lowercase()
            .as_str()
        {
            "hosted" | "production" => AppEnv::Hosted,
            _ => AppEnv::Local,
        };

        let rate_limit_capacity = std::env::var("RATE_LIMIT_CAPACITY")
            .unwrap_or_else(|_| "10".into())
            .parse::<u32>()
            .context("RATE_LIMIT_CAPACITY must be a non-negative integer")?;

        let rate_limit_refill_per_sec = std::env::var("RATE_LIMIT_REFILL_PER_SEC")
            .unwrap_or_else(|_| "1.0".into())
            .parse::<f64>()
            .context("RATE_LIMIT_REFILL_PER_SEC must be a number")?;

        let list_page_size = std::env::var("LIST_PAGE_SIZE")
            .unwrap_or_else(|_| "256".into())
            .parse::<u32>()
            .context("LIST_PAGE_SIZE must be a positive integer")?;
        if list_page_size == 0 {
            anyhow::bail!("LIST_PAGE_SIZE must be at least 1");
        }

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./hashly.db".into()),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            slice_len,
            env,
            rate_limit_capacity,
            rate_limit_refill_per_sec,
            list_page_size,
        })
    }

    /// Render the externally visible short URL for a token. In `Local` mode
    /// the hostname is fixed; in `Hosted` mode it is taken from the request.
    pub fn short_url(&self, request_host: &str, token: &str) -> String {
        match self.env {
            AppEnv::Local => format!("http://localhost:{}/s/{}", self.port, token),
            AppEnv::Hosted => format!("https://{}/s/{}", request_host, token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(env: AppEnv) -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".into(),
            host: "127.0.0.1".into(),
            port: 3000,
            slice_len: 4,
            env,
            rate_limit_capacity: 10,
            rate_limit_refill_per_sec: 1.0,
            list_page_size: 256,
        }
    }

    #[test]
    fn local_short_url_ignores_request_host() {
        let cfg = config(AppEnv::Local);
        assert_eq!(
            cfg.short_url("sho.rt", "3641cad4"),
            "http://localhost:3000/s/3641cad4"
        );
    }

    #[test]
    fn hosted_short_url_uses_request_host() {
        let cfg = config(AppEnv::Hosted);
        assert_eq!(
            cfg.short_url("sho.rt", "3641cad4"),
            "https://sho.rt/s/3641cad4"
        );
    }
}
