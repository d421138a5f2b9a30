use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::model::{
    CurrentConditions, Forecast, ForecastEntry, Units, WeatherCondition, WeatherRequest,
    WeatherSample,
};

use super::{
    ProviderError, ProviderId, WeatherProvider, parse_json, read_success_body, truncate_body,
    unix_to_utc,
};

const PROVIDER: &str = "WeatherAPI";
const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";
const FORECAST_DAYS: u8 = 5;
/// WeatherAPI error code for "No matching location found".
const NO_LOCATION_CODE: u32 = 1006;

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn fetch(&self, request: &WeatherRequest, days: u8) -> Result<WaForecastResponse> {
        let url = format!("{}/forecast.json", self.base_url);
        log::debug!("GET {url} q={} days={days}", request.location);
        let days = days.to_string();

        let res = self
            .http
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", request.location.as_str()),
                ("days", days.as_str()),
            ])
            .send()
            .await
            .context("Failed to send request to WeatherAPI.com (forecast)")?;

        // WeatherAPI reports unknown locations as 400 with an error code
        if res.status() == StatusCode::BAD_REQUEST {
            let status = res.status();
            let body = res.text().await.context("Failed to read WeatherAPI error body")?;
            log::warn!("{PROVIDER} answered {status} for '{}'", request.location);

            let err = match serde_json::from_str::<WaErrorResponse>(&body) {
                Ok(e) if e.error.code == NO_LOCATION_CODE => ProviderError::LocationNotFound {
                    provider: PROVIDER,
                    location: request.location.clone(),
                },
                _ => ProviderError::Api {
                    provider: PROVIDER,
                    status,
                    body: truncate_body(&body),
                },
            };
            return Err(err.into());
        }

        let body = read_success_body(PROVIDER, &request.location, res).await?;
        parse_json(PROVIDER, &body)
    }

    async fn fetch_current(&self, request: &WeatherRequest) -> Result<CurrentConditions> {
        let parsed = self.fetch(request, 1).await?;
        let current = &parsed.current;

        let today = parsed
            .forecast
            .forecastday
            .first()
            .ok_or_else(|| anyhow!("WeatherAPI response contained no forecastday data"))?;

        let offset = local_offset(&parsed.location.localtime, parsed.location.localtime_epoch)?;
        let sunrise = astro_to_utc(today.date, &today.astro.sunrise, offset)?;
        let sunset = astro_to_utc(today.date, &today.astro.sunset, offset)?;

        let observation_time = current
            .last_updated_epoch
            .and_then(unix_to_utc)
            .unwrap_or_else(Utc::now);

        let (temperature, feels_like, wind_speed) = match request.units {
            Units::Celsius => (current.temp_c, current.feelslike_c, current.wind_kph / 3.6),
            Units::Fahrenheit => (current.temp_f, current.feelslike_f, current.wind_mph),
        };

        Ok(CurrentConditions {
            location_name: parsed.location.display_name(),
            status: current.condition.text.clone(),
            condition: condition_from_code(current.condition.code),
            temperature,
            feels_like,
            humidity_pct: current.humidity,
            wind_speed,
            cloud_cover_pct: current.cloud,
            icon_url: current.condition.icon.as_deref().map(icon_url),
            sunrise,
            sunset,
            observation_time,
        })
    }

    async fn fetch_forecast(&self, request: &WeatherRequest) -> Result<Forecast> {
        let parsed = self.fetch(request, FORECAST_DAYS).await?;

        let entries = parsed
            .forecast
            .forecastday
            .iter()
            .flat_map(|day| day.hour.iter())
            .map(|hour| {
                let timestamp = unix_to_utc(hour.time_epoch).ok_or_else(|| {
                    anyhow!("WeatherAPI forecast has invalid time {}", hour.time_epoch)
                })?;
                let temperature = match request.units {
                    Units::Celsius => hour.temp_c,
                    Units::Fahrenheit => hour.temp_f,
                };

                Ok(ForecastEntry {
                    sample: WeatherSample::new(timestamp, temperature, hour.humidity),
                    condition: condition_from_code(hour.condition.code),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if entries.is_empty() {
            return Err(anyhow!("WeatherAPI response contained no hourly data"));
        }

        Ok(Forecast {
            location_name: parsed.location.display_name(),
            entries,
        })
    }
}

/// Map a WeatherAPI condition code onto a [`WeatherCondition`].
pub fn condition_from_code(code: u32) -> WeatherCondition {
    match code {
        1000 => WeatherCondition::Clear,
        1003 | 1006 | 1009 => WeatherCondition::Clouds,
        1030 | 1135 | 1147 => WeatherCondition::Fog,
        1087 | 1273..=1282 => WeatherCondition::Storm,
        1063 | 1072 | 1150..=1201 | 1240..=1246 => WeatherCondition::Rain,
        1066 | 1069 | 1114 | 1117 | 1204..=1237 | 1249..=1264 => WeatherCondition::Snow,
        _ => WeatherCondition::Other,
    }
}

/// WeatherAPI icons come protocol-relative (`//cdn.weatherapi.com/...`).
fn icon_url(icon: &str) -> String {
    if icon.starts_with("//") {
        format!("https:{icon}")
    } else {
        icon.to_string()
    }
}

/// UTC offset of the location, from its local wall clock and the matching epoch.
///
/// `localtime` has minute precision, so the difference is rounded to the
/// nearest quarter hour.
fn local_offset(localtime: &str, localtime_epoch: i64) -> Result<FixedOffset> {
    let local = NaiveDateTime::parse_from_str(localtime, "%Y-%m-%d %H:%M")
        .with_context(|| format!("Invalid WeatherAPI localtime '{localtime}'"))?;

    let diff = local.and_utc().timestamp() - localtime_epoch;
    let rounded = (diff + 450).div_euclid(900) * 900;

    i32::try_from(rounded)
        .ok()
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| anyhow!("WeatherAPI localtime gives an invalid UTC offset ({rounded}s)"))
}

/// Convert an astro time like `07:58 AM` on `date` at `offset` into UTC.
///
/// Near the poles WeatherAPI answers `No sunrise` / `No sunset`, which maps to `None`.
fn astro_to_utc(date: NaiveDate, time: &str, offset: FixedOffset) -> Result<Option<DateTime<Utc>>> {
    let time = time.trim();
    if time.starts_with("No ") {
        return Ok(None);
    }

    let time = NaiveTime::parse_from_str(time, "%I:%M %p")
        .with_context(|| format!("Invalid WeatherAPI astro time '{time}'"))?;

    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .ok_or_else(|| anyhow!("Ambiguous local time {date} {time}"))
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
    localtime_epoch: i64,
    localtime: String,
}

impl WaLocation {
    fn display_name(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: Option<String>,
    code: u32,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    temp_f: f64,
    feelslike_c: f64,
    feelslike_f: f64,
    humidity: u8,
    wind_kph: f64,
    wind_mph: f64,
    #[serde(default)]
    cloud: u8,
    condition: WaCondition,
    last_updated_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaForecastHour {
    time_epoch: i64,
    temp_c: f64,
    temp_f: f64,
    humidity: u8,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaAstro {
    sunrise: String,
    sunset: String,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: NaiveDate,
    astro: WaAstro,
    hour: Vec<WaForecastHour>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    current: WaCurrent,
    forecast: WaForecast,
}

#[derive(Debug, Deserialize)]
struct WaErrorBody {
    code: u32,
}

#[derive(Debug, Deserialize)]
struct WaErrorResponse {
    error: WaErrorBody,
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherApi
    }

    async fn current(&self, request: &WeatherRequest) -> Result<CurrentConditions> {
        self.fetch_current(request).await
    }

    async fn forecast(&self, request: &WeatherRequest) -> Result<Forecast> {
        self.fetch_forecast(request).await
    }
}
