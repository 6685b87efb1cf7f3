use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    /// Redis address, bare `host:port` or a `redis://` URL
    pub redis_url: String,
    pub telegram_token: String,
    pub web_port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source. Every value is required;
    /// a missing or blank one is an error.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> anyhow::Result<String> {
            match lookup(name) {
                Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
                _ => anyhow::bail!("required environment variable {} is not set", name),
            }
        };

        let web_port = required("WEB_PORT")?;
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            telegram_token: required("TELEGRAM_TOKEN")?,
            web_port: web_port
                .parse()
                .with_context(|| format!("WEB_PORT is not a valid port: {}", web_port))?,
        })
    }
}
