use std::{fmt, str::FromStr};

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Temperature unit system requested from the provider.
///
/// Values are converted upstream; nothing in this crate converts between units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Celsius,
    Fahrenheit,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Celsius => "celsius",
            Units::Fahrenheit => "fahrenheit",
        }
    }

    /// Degree symbol plus letter, e.g. `°C`.
    pub fn degree_label(&self) -> &'static str {
        match self {
            Units::Celsius => "°C",
            Units::Fahrenheit => "°F",
        }
    }

    pub fn wind_label(&self) -> &'static str {
        match self {
            Units::Celsius => "m/s",
            Units::Fahrenheit => "mph",
        }
    }

    /// Value of the OpenWeather `units` query parameter.
    pub fn openweather_param(&self) -> &'static str {
        match self {
            Units::Celsius => "metric",
            Units::Fahrenheit => "imperial",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "celsius" | "c" | "metric" => Ok(Units::Celsius),
            "fahrenheit" | "f" | "imperial" => Ok(Units::Fahrenheit),
            _ => Err(anyhow!("Unknown unit '{s}'. Supported units: celsius, fahrenheit.")),
        }
    }
}

/// How the temperature chart draws its two series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartStyle {
    #[default]
    Bar,
    Line,
}

impl ChartStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartStyle::Bar => "bar",
            ChartStyle::Line => "line",
        }
    }
}

impl fmt::Display for ChartStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bar" | "bar graph" => Ok(ChartStyle::Bar),
            "line" | "line graph" => Ok(ChartStyle::Line),
            _ => Err(anyhow!("Unknown chart style '{s}'. Supported styles: bar, line.")),
        }
    }
}

/// Everything a provider needs to answer a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherRequest {
    pub location: String,
    pub units: Units,
}

impl WeatherRequest {
    pub fn new(location: impl Into<String>, units: Units) -> Self {
        Self {
            location: location.into(),
            units,
        }
    }
}

/// Coarse condition category used for alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Clear,
    Clouds,
    Rain,
    Snow,
    Fog,
    Storm,
    Hurricane,
    Tornado,
    Other,
}

/// One forecast tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub timestamp: DateTime<Utc>,
    /// Already in the requested unit.
    pub temperature: f64,
    pub humidity: u8,
}

impl WeatherSample {
    pub fn new(timestamp: DateTime<Utc>, temperature: f64, humidity: u8) -> Self {
        Self {
            timestamp,
            temperature,
            humidity,
        }
    }
}

/// Aggregated values for one UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub day: NaiveDate,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Highest humidity seen that day.
    pub humidity_repr: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub sample: WeatherSample,
    pub condition: WeatherCondition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub location_name: String,
    pub entries: Vec<ForecastEntry>,
}

impl Forecast {
    pub fn samples(&self) -> Vec<WeatherSample> {
        self.entries.iter().map(|e| e.sample).collect()
    }

    pub fn conditions(&self) -> impl Iterator<Item = WeatherCondition> + '_ {
        self.entries.iter().map(|e| e.condition)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    /// Detailed status text, e.g. "light rain".
    pub status: String,
    pub condition: WeatherCondition,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub cloud_cover_pct: u8,
    pub icon_url: Option<String>,
    /// `None` when the sun does not rise (or set) that day, e.g. polar night.
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub observation_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_parse_aliases() {
        assert_eq!("Celsius".parse::<Units>().unwrap(), Units::Celsius);
        assert_eq!("c".parse::<Units>().unwrap(), Units::Celsius);
        assert_eq!("imperial".parse::<Units>().unwrap(), Units::Fahrenheit);
        assert_eq!(" F ".parse::<Units>().unwrap(), Units::Fahrenheit);
    }

    #[test]
    fn unknown_unit_error() {
        let err = "kelvin".parse::<Units>().unwrap_err();
        assert!(err.to_string().contains("Unknown unit"));
    }

    #[test]
    fn units_labels() {
        assert_eq!(Units::Celsius.degree_label(), "°C");
        assert_eq!(Units::Fahrenheit.degree_label(), "°F");
        assert_eq!(Units::Fahrenheit.wind_label(), "mph");
        assert_eq!(Units::Celsius.openweather_param(), "metric");
    }

    #[test]
    fn chart_style_parse() {
        assert_eq!("Bar Graph".parse::<ChartStyle>().unwrap(), ChartStyle::Bar);
        assert_eq!("line".parse::<ChartStyle>().unwrap(), ChartStyle::Line);
        assert!("pie".parse::<ChartStyle>().is_err());
    }

    #[test]
    fn units_serde_lowercase() {
        let s = serde_json::to_string(&Units::Fahrenheit).unwrap();
        assert_eq!(s, "\"fahrenheit\"");
    }
}
