use crate::{
    Config, CurrentConditions, Forecast, WeatherRequest,
    provider::{openweather::OpenWeatherProvider, weatherapi::WeatherApiProvider},
};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use std::{convert::TryFrom, fmt::Debug};
use thiserror::Error;

pub mod openweather;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    /// Human-readable name used in the "Data provided by" footer.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "OpenWeatherMap",
            ProviderId::WeatherApi => "WeatherAPI.com",
        }
    }

    /// Environment variable that overrides the stored API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "OPENWEATHER_API_KEY",
            ProviderId::WeatherApi => "WEATHERAPI_API_KEY",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::WeatherApi]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, weatherapi."
            )),
        }
    }
}

impl std::str::FromStr for ProviderId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderId::try_from(s)
    }
}

/// Failures reported by a weather service itself.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} rejected the API key (status {status})")]
    Unauthorized {
        provider: &'static str,
        status: StatusCode,
    },

    #[error("{provider} could not find location '{location}'")]
    LocationNotFound {
        provider: &'static str,
        location: String,
    },

    #[error("{provider} request failed with status {status}: {body}")]
    Api {
        provider: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to parse {provider} response: {source}")]
    Parse {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    async fn current(&self, request: &WeatherRequest) -> anyhow::Result<CurrentConditions>;

    async fn forecast(&self, request: &WeatherRequest) -> anyhow::Result<Forecast>;
}

/// Looks up an environment variable by name.
pub type EnvLookup = fn(&str) -> Option<String>;

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Resolve the API key for `id`: environment first, then the config file.
pub fn resolve_api_key(id: ProviderId, config: &Config) -> Option<String> {
    resolve_api_key_with(id, config, process_env)
}

/// [`resolve_api_key`] with an explicit environment lookup.
pub fn resolve_api_key_with(id: ProviderId, config: &Config, env: EnvLookup) -> Option<String> {
    env(id.api_key_env())
        .filter(|key| !key.trim().is_empty())
        .or_else(|| config.provider_api_key(id).map(str::to_owned))
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    provider_from_config_with(id, config, process_env)
}

fn provider_from_config_with(
    id: ProviderId,
    config: &Config,
    env: EnvLookup,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = resolve_api_key_with(id, config, env).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider '{id}'.\n\
                 Hint: run `skycast configure {id}` or set {}.",
            id.api_key_env()
        )
    })?;

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::OpenWeather => Box::new(OpenWeatherProvider::new(api_key)),
        ProviderId::WeatherApi => Box::new(WeatherApiProvider::new(api_key)),
    };

    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

/// Read the response body, turning non-success statuses into [`ProviderError`].
pub(crate) async fn read_success_body(
    provider: &'static str,
    location: &str,
    res: reqwest::Response,
) -> anyhow::Result<String> {
    let status = res.status();
    let body = res
        .text()
        .await
        .with_context(|| format!("Failed to read {provider} response body"))?;

    if status.is_success() {
        return Ok(body);
    }

    log::warn!("{provider} answered {status} for '{location}'");

    let err = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::Unauthorized { provider, status }
        }
        StatusCode::NOT_FOUND => ProviderError::LocationNotFound {
            provider,
            location: location.to_string(),
        },
        _ => ProviderError::Api {
            provider,
            status,
            body: truncate_body(&body),
        },
    };

    Err(err.into())
}

pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(
    provider: &'static str,
    body: &str,
) -> anyhow::Result<T> {
    serde_json::from_str(body).map_err(|source| ProviderError::Parse { provider, source }.into())
}

pub(crate) fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
