use serde::Deserialize;
use service_core::config::{self as core_config, get_env};
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct ContactConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub mongodb: MongoConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Directory of static assets served for paths no API route matches.
    pub static_dir: Option<String>,
    /// CORS origins; a single `*` allows any origin.
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl HttpConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            static_dir: None,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 10,
        }
    }
}

impl ContactConfig {
    pub fn load() -> Result<Self, AppError> {
        // Handles .env, APP__* and the bare PORT variable
        let common = core_config::Config::load()?;
        let is_prod = common.is_prod();

        let request_timeout_secs = get_env("REQUEST_TIMEOUT_SECS", Some("10"), is_prod)?
            .parse()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Invalid REQUEST_TIMEOUT_SECS: {}", e))
            })?;

        Ok(ContactConfig {
            common,
            service_name: get_env("SERVICE_NAME", Some("contact-service"), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|e| !e.is_empty()),
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", None, is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("phonebook"), is_prod)?,
            },
            http: HttpConfig {
                static_dir: env::var("STATIC_DIR").ok().filter(|d| !d.is_empty()),
                allowed_origins: parse_origins(&get_env("ALLOWED_ORIGINS", Some("*"), is_prod)?),
                request_timeout_secs,
            },
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}
