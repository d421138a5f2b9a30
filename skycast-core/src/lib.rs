//! Core library for the `skycast` weather dashboard.
//!
//! This crate defines:
//! - Shared domain models (requests, samples, daily summaries)
//! - The daily forecast aggregator and categorical weather alerts
//! - Abstraction over weather providers
//! - Configuration & credentials handling
//! - SVG chart rendering
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod aggregate;
pub mod alerts;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod model;
pub mod provider;

pub use aggregate::aggregate;
pub use alerts::{Alert, weather_alerts};
pub use config::{Config, ProviderConfig};
pub use dashboard::{Dashboard, load_dashboard};
pub use model::{
    ChartStyle, CurrentConditions, DailySummary, Forecast, ForecastEntry, Units, WeatherCondition,
    WeatherRequest, WeatherSample,
};
pub use provider::{ProviderError, ProviderId, WeatherProvider};
