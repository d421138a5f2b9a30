//! Categorical "X expected" alerts derived from forecast conditions.

use std::fmt;

use serde::Serialize;

use crate::model::WeatherCondition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Alert {
    Clouds,
    Rain,
    Snow,
    Fog,
    Storm,
    Hurricane,
    Tornado,
}

impl Alert {
    /// Display order.
    pub const fn all() -> &'static [Alert] {
        &[
            Alert::Clouds,
            Alert::Rain,
            Alert::Snow,
            Alert::Fog,
            Alert::Storm,
            Alert::Hurricane,
            Alert::Tornado,
        ]
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Alert::Clouds => "☁️",
            Alert::Rain => "🌧️",
            Alert::Snow => "❄️",
            Alert::Fog => "🌫️",
            Alert::Storm => "⛈️",
            Alert::Hurricane => "🌀",
            Alert::Tornado => "🌪️",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Alert::Clouds => "Clouds expected",
            Alert::Rain => "Rain expected",
            Alert::Snow => "Snow expected",
            Alert::Fog => "Fog expected",
            Alert::Storm => "Storm expected",
            Alert::Hurricane => "Hurricane expected",
            Alert::Tornado => "Tornado expected",
        }
    }

    fn condition(&self) -> WeatherCondition {
        match self {
            Alert::Clouds => WeatherCondition::Clouds,
            Alert::Rain => WeatherCondition::Rain,
            Alert::Snow => WeatherCondition::Snow,
            Alert::Fog => WeatherCondition::Fog,
            Alert::Storm => WeatherCondition::Storm,
            Alert::Hurricane => WeatherCondition::Hurricane,
            Alert::Tornado => WeatherCondition::Tornado,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon(), self.message())
    }
}

/// One alert for every category that shows up anywhere in `conditions`.
pub fn weather_alerts<I>(conditions: I) -> Vec<Alert>
where
    I: IntoIterator<Item = WeatherCondition>,
{
    let seen: Vec<WeatherCondition> = conditions.into_iter().collect();

    Alert::all().iter().copied().filter(|alert| seen.contains(&alert.condition())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use WeatherCondition::*;

    #[test]
    fn clear_forecast_has_no_alerts() {
        assert!(weather_alerts([Clear, Clear, Other]).is_empty());
        assert!(weather_alerts(Vec::new()).is_empty());
    }

    #[test]
    fn alerts_are_unique_and_in_fixed_order() {
        let alerts = weather_alerts([Tornado, Rain, Clouds, Rain, Snow, Rain]);

        assert_eq!(alerts, vec![Alert::Clouds, Alert::Rain, Alert::Snow, Alert::Tornado]);
    }

    #[test]
    fn every_category_maps_to_an_alert() {
        let alerts = weather_alerts([Clouds, Rain, Snow, Fog, Storm, Hurricane, Tornado]);
        assert_eq!(alerts.as_slice(), Alert::all());
    }

    #[test]
    fn display_includes_icon_and_message() {
        assert_eq!(Alert::Rain.to_string(), "🌧️ Rain expected");
    }
}
