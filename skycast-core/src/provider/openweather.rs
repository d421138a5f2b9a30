use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::model::{
    CurrentConditions, Forecast, ForecastEntry, WeatherCondition, WeatherRequest, WeatherSample,
};

use super::{ProviderId, WeatherProvider, parse_json, read_success_body, unix_to_utc};

const PROVIDER: &str = "OpenWeather";
const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the provider at another host, e.g. a mock server.
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn get(&self, endpoint: &str, request: &WeatherRequest) -> Result<String> {
        let url = format!("{}/{endpoint}", self.base_url);
        log::debug!("GET {url} q={} units={}", request.location, request.units);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", request.location.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", request.units.openweather_param()),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({endpoint})"))?;

        read_success_body(PROVIDER, &request.location, res).await
    }

    async fn fetch_current(&self, request: &WeatherRequest) -> Result<CurrentConditions> {
        let body = self.get("weather", request).await?;
        let parsed: OwCurrentResponse = parse_json(PROVIDER, &body)?;

        let observation_time = unix_to_utc(parsed.dt).unwrap_or_else(Utc::now);
        let sunrise = sun_event(parsed.sys.sunrise);
        let sunset = sun_event(parsed.sys.sunset);

        let weather = parsed.weather.first();
        let status = weather
            .map(|w| w.description.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let condition = weather.map_or(WeatherCondition::Other, |w| condition_from_code(w.id));
        let icon_url = weather.filter(|w| !w.icon.is_empty()).map(|w| icon_url(&w.icon));

        let location_name = match parsed.sys.country {
            Some(country) => format!("{}, {}", parsed.name, country),
            None => parsed.name,
        };

        Ok(CurrentConditions {
            location_name,
            status,
            condition,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            cloud_cover_pct: parsed.clouds.all,
            icon_url,
            sunrise,
            sunset,
            observation_time,
        })
    }

    async fn fetch_forecast(&self, request: &WeatherRequest) -> Result<Forecast> {
        let body = self.get("forecast", request).await?;
        let parsed: OwForecastResponse = parse_json(PROVIDER, &body)?;

        if parsed.list.is_empty() {
            return Err(anyhow!("OpenWeather forecast response contained no data"));
        }

        let entries = parsed
            .list
            .iter()
            .map(|entry| {
                let timestamp = unix_to_utc(entry.dt)
                    .ok_or_else(|| anyhow!("OpenWeather forecast has invalid time {}", entry.dt))?;
                let condition = entry
                    .weather
                    .first()
                    .map_or(WeatherCondition::Other, |w| condition_from_code(w.id));

                Ok(ForecastEntry {
                    sample: WeatherSample::new(timestamp, entry.main.temp, entry.main.humidity),
                    condition,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let location_name = format!("{}, {}", parsed.city.name, parsed.city.country);

        Ok(Forecast {
            location_name,
            entries,
        })
    }
}

/// Map an OpenWeather condition id onto a [`WeatherCondition`].
pub fn condition_from_code(code: u16) -> WeatherCondition {
    match code {
        200..=232 | 901 | 960 | 961 => WeatherCondition::Storm,
        300..=321 | 500..=531 => WeatherCondition::Rain,
        600..=622 => WeatherCondition::Snow,
        701 | 711 | 721 | 741 => WeatherCondition::Fog,
        781 | 900 => WeatherCondition::Tornado,
        800 => WeatherCondition::Clear,
        801..=804 => WeatherCondition::Clouds,
        902 | 962 => WeatherCondition::Hurricane,
        _ => WeatherCondition::Other,
    }
}

fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon}@4x.png")
}

/// Polar day and night come back as a missing or zero timestamp.
fn sun_event(ts: Option<i64>) -> Option<DateTime<Utc>> {
    ts.filter(|&ts| ts != 0).and_then(unix_to_utc)
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: u16,
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
    #[serde(default)]
    sunrise: Option<i64>,
    #[serde(default)]
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    clouds: OwClouds,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    async fn current(&self, request: &WeatherRequest) -> Result<CurrentConditions> {
        self.fetch_current(request).await
    }

    async fn forecast(&self, request: &WeatherRequest) -> Result<Forecast> {
        self.fetch_forecast(request).await
    }
}
