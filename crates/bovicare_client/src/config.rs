use std::path::PathBuf;
use std::time::Duration;

use crate::BovicareError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn parse(s: &str) -> Result<Self, BovicareError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(BovicareError::Config(format!(
                "unknown BOVICARE_ENV: {other}"
            ))),
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Environment::Development => "http://localhost:5003",
            Environment::Production => "https://api.bovicare.com",
            Environment::Test => "http://localhost:5000",
        }
    }

    pub fn default_timeout(self) -> Duration {
        match self {
            Environment::Development => Duration::from_millis(10_000),
            Environment::Production => Duration::from_millis(15_000),
            Environment::Test => Duration::from_millis(5_000),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub base_url: String,
    /// Client-side timeout applied to every request.
    pub timeout: Duration,
    /// Durable session file; `None` keeps the session in memory only.
    pub session_file: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, BovicareError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Same as [`Config::from_env`] but reads values through `get`, so tests
    /// never touch the process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, BovicareError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let environment = match get("BOVICARE_ENV").filter(|s| !s.trim().is_empty()) {
            Some(s) => Environment::parse(&s)?,
            None => Environment::default(),
        };
        let base_url = get("BOVICARE_API_BASE_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| environment.default_base_url().to_string());
        let timeout = match get("BOVICARE_TIMEOUT_MS").filter(|s| !s.trim().is_empty()) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| {
                    BovicareError::Config(format!("BOVICARE_TIMEOUT_MS is not a number: {raw}"))
                })?,
            None => environment.default_timeout(),
        };
        let session_file = get("BOVICARE_SESSION_FILE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        Ok(Self {
            environment,
            base_url,
            timeout,
            session_file,
        })
    }
}
