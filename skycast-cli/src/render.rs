//! Plain-text rendering of dashboard sections.

use chrono::{DateTime, Utc};
use skycast_core::{Alert, CurrentConditions, DailySummary, Units};

const RULE: &str = "------------------------------------------------------------";

pub const NOT_FOUND_HINT: &str =
    "If city not found, try format: 'city, country code' (e.g. 'London, GB')";

pub fn section(title: &str) -> String {
    format!("{RULE}\n{title}\n")
}

/// Whole degrees with the unit label, e.g. `12°C`.
pub fn temperature(value: f64, units: Units) -> String {
    format!("{}{}", value.round() as i64, units.degree_label())
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn current_weather(current: &CurrentConditions, units: Units) -> String {
    let mut lines = vec![
        current.location_name.clone(),
        title_case(&current.status),
        format!("  Temperature: {}", temperature(current.temperature, units)),
        format!("  Feels like:  {}", temperature(current.feels_like, units)),
        format!("  Humidity:    {}%", current.humidity_pct),
        format!("  Wind speed:  {:.2} {}", current.wind_speed, units.wind_label()),
        format!("  Cloud cover: {}%", current.cloud_cover_pct),
    ];
    if let Some(icon) = &current.icon_url {
        lines.push(format!("  Icon:        {icon}"));
    }

    lines.iter().map(|line| format!("{line}\n")).collect()
}

fn table_row(date: &str, min: &str, max: &str, humidity: &str) -> String {
    format!("  {date:<8}{min:>8}{max:>8}{humidity:>10}\n")
}

pub fn forecast_table(days: &[DailySummary], units: Units) -> String {
    let header = table_row("Date", "Min", "Max", "Humidity");
    let rows = days.iter().map(|day| {
        table_row(
            &day.day.format("%m/%d").to_string(),
            &temperature(day.temp_min, units),
            &temperature(day.temp_max, units),
            &format!("{}%", day.humidity_repr),
        )
    });

    std::iter::once(header).chain(rows).collect()
}

fn sun_event(title: &str, at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => format!(
            "{title}\n  Date: {}\n  Time: {} UTC\n",
            at.date_naive(),
            at.format("%H:%M:%S")
        ),
        None => format!("{title}\n  No {} today\n", title.to_lowercase()),
    }
}

pub fn sun_times(current: &CurrentConditions) -> String {
    format!(
        "{}\n{}",
        sun_event("Sunrise", current.sunrise),
        sun_event("Sunset", current.sunset)
    )
}

pub fn alerts(alerts: &[Alert]) -> String {
    if alerts.is_empty() {
        return "  ✅ No weather alerts\n".to_string();
    }

    alerts.iter().map(|alert| format!("  {alert}\n")).collect()
}

pub fn footer(provider_name: &str) -> String {
    format!("{RULE}\nData provided by {provider_name}\n")
}
