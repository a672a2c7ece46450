use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use terreno_core::AppError;
use terreno_domain::AggregateSource;
use tracing_subscriber::EnvFilter;

/// Where dashboard documents come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSourceKind {
    Http,
    Memory,
}

impl FromStr for ConfigSourceKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::Validation(format!(
                "TERRENO_CONFIG_SOURCE must be either 'http' or 'memory', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub bearer_token: Option<String>,
    pub timeout_ms: u64,
    pub max_attempts: u8,
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub config_source: ConfigSourceKind,
    pub upstream: Option<UpstreamConfig>,
    pub aggregate_source: AggregateSource,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let frontend_url =
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());
        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = lookup("API_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3002);

        let config_source = lookup("TERRENO_CONFIG_SOURCE")
            .map(|value| ConfigSourceKind::from_str(&value))
            .transpose()?
            .unwrap_or(ConfigSourceKind::Http);

        let upstream = match config_source {
            ConfigSourceKind::Memory => None,
            ConfigSourceKind::Http => Some(load_upstream(&lookup)?),
        };

        let aggregate_source = if lookup("TERRENO_TRUST_REPORTED_AGGREGATES")
            .unwrap_or_else(|| "false".to_owned())
            .eq_ignore_ascii_case("true")
        {
            AggregateSource::Reported
        } else {
            AggregateSource::Derived
        };

        Ok(Self {
            frontend_url,
            api_host,
            api_port,
            config_source,
            upstream,
            aggregate_source,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

fn load_upstream<F>(lookup: &F) -> Result<UpstreamConfig, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let base_url = required_non_empty_env(lookup, "TERRENO_UPSTREAM_URL")?;
    let bearer_token = lookup("TERRENO_UPSTREAM_TOKEN").filter(|value| !value.trim().is_empty());

    let timeout_ms = match lookup("TERRENO_UPSTREAM_TIMEOUT_MS") {
        Some(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid TERRENO_UPSTREAM_TIMEOUT_MS: {error}"))
        })?,
        None => 10_000,
    };
    if timeout_ms == 0 {
        return Err(AppError::Validation(
            "TERRENO_UPSTREAM_TIMEOUT_MS must be greater than zero".to_owned(),
        ));
    }

    let max_attempts = lookup("TERRENO_UPSTREAM_MAX_ATTEMPTS")
        .and_then(|value| value.parse::<u8>().ok())
        .unwrap_or(3);
    let retry_backoff_ms = lookup("TERRENO_UPSTREAM_RETRY_BACKOFF_MS")
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(250);

    Ok(UpstreamConfig {
        base_url,
        bearer_token,
        timeout_ms,
        max_attempts,
        retry_backoff_ms,
    })
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env<F>(lookup: &F, name: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env<F>(lookup: &F, name: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = required_env(lookup, name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use terreno_core::AppError;
    use terreno_domain::AggregateSource;

    use super::{ApiConfig, ConfigSourceKind};

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        ApiConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn http_source_requires_upstream_url() {
        let result = load(&[]);
        assert!(matches!(
            result,
            Err(AppError::Validation(message)) if message.contains("TERRENO_UPSTREAM_URL")
        ));
    }

    #[test]
    fn defaults_apply_for_http_source() {
        let config = load(&[("TERRENO_UPSTREAM_URL", "https://upstream.example/api")])
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(config.api_port, 3002);
        assert_eq!(config.config_source, ConfigSourceKind::Http);
        assert_eq!(config.aggregate_source, AggregateSource::Derived);
        let upstream = config.upstream.unwrap_or_else(|| unreachable!());
        assert_eq!(upstream.timeout_ms, 10_000);
        assert!(upstream.bearer_token.is_none());
    }

    #[test]
    fn memory_source_needs_no_upstream() {
        let config = load(&[
            ("TERRENO_CONFIG_SOURCE", "memory"),
            ("TERRENO_TRUST_REPORTED_AGGREGATES", "TRUE"),
        ])
        .unwrap_or_else(|_| unreachable!());

        assert!(config.upstream.is_none());
        assert_eq!(config.aggregate_source, AggregateSource::Reported);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let result = load(&[
            ("TERRENO_UPSTREAM_URL", "https://upstream.example"),
            ("TERRENO_UPSTREAM_TIMEOUT_MS", "0"),
        ]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn unknown_config_source_is_rejected() {
        let result = load(&[("TERRENO_CONFIG_SOURCE", "redis")]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn socket_address_rejects_hostnames() {
        let mut config =
            load(&[("TERRENO_CONFIG_SOURCE", "memory")]).unwrap_or_else(|_| unreachable!());
        config.api_host = "localhost".to_owned();
        assert!(config.socket_address().is_err());
    }
}
