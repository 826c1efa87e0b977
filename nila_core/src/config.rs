use thiserror::Error;

pub const DATABASE_URL_VAR: &str = "COLLECTOR_DATABASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set in environment or .env")]
    MissingVar(&'static str),
}

/// Everything the collector needs from the environment, resolved once at
/// startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub api_key: String,
    pub database_url: String,
}

impl CollectorConfig {
    /// `api_key_var` is provider specific (e.g. GOOGLE_MAPS_API_KEY), the
    /// database URL variable is shared. Empty values count as missing.
    pub fn from_env(api_key_var: &'static str) -> Result<Self, ConfigError> {
        Ok(CollectorConfig {
            api_key: require_var(api_key_var)?,
            database_url: require_var(DATABASE_URL_VAR)?,
        })
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}
