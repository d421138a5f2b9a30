//! Everything one "Get Weather" refresh shows, fetched and derived in one go.

use anyhow::Result;
use serde::Serialize;

use crate::{
    aggregate::aggregate,
    alerts::{Alert, weather_alerts},
    model::{CurrentConditions, DailySummary, WeatherRequest},
    provider::WeatherProvider,
};

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub request: WeatherRequest,
    pub current: CurrentConditions,
    pub forecast_location: String,
    pub days: Vec<DailySummary>,
    pub alerts: Vec<Alert>,
}

/// Fetch current conditions and the forecast once, then derive the daily
/// rows and alerts from that single forecast.
pub async fn load_dashboard(
    provider: &dyn WeatherProvider,
    request: &WeatherRequest,
) -> Result<Dashboard> {
    let current = provider.current(request).await?;
    let forecast = provider.forecast(request).await?;

    let days = aggregate(&forecast.samples());
    let alerts = weather_alerts(forecast.conditions());

    Ok(Dashboard {
        request: request.clone(),
        current,
        forecast_location: forecast.location_name,
        days,
        alerts,
    })
}
