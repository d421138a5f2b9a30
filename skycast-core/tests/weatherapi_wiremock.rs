//! WeatherAPI.com provider against a mock HTTP server.

use skycast_core::{
    Alert, ProviderError, Units, WeatherCondition, WeatherProvider, WeatherRequest, aggregate,
    load_dashboard, provider::weatherapi::WeatherApiProvider,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn hour(epoch: i64, temp_c: f64, humidity: u8, code: u32) -> serde_json::Value {
    serde_json::json!({
        "time_epoch": epoch,
        "temp_c": temp_c,
        "temp_f": temp_c * 9.0 / 5.0 + 32.0,
        "humidity": humidity,
        "condition": {
            "text": "",
            "icon": "//cdn.weatherapi.com/weather/64x64/day/113.png",
            "code": code
        }
    })
}

fn forecast_response() -> serde_json::Value {
    serde_json::json!({
        "location": {
            "name": "Boston",
            "country": "United States of America",
            "localtime_epoch": 1709294400,
            "localtime": "2024-03-01 7:00"
        },
        "current": {
            "last_updated_epoch": 1709294100,
            "temp_c": 2.0,
            "temp_f": 35.6,
            "feelslike_c": -1.5,
            "feelslike_f": 29.3,
            "humidity": 64,
            "wind_kph": 18.0,
            "wind_mph": 11.2,
            "cloud": 50,
            "condition": {
                "text": "Partly cloudy",
                "icon": "//cdn.weatherapi.com/weather/64x64/day/116.png",
                "code": 1003
            }
        },
        "forecast": {
            "forecastday": [
                {
                    "date": "2024-03-01",
                    "astro": { "sunrise": "06:13 AM", "sunset": "05:38 PM" },
                    "hour": [
                        hour(1709294400, 2.0, 64, 1003),
                        hour(1709305200, 6.0, 50, 1000),
                        hour(1709316000, 4.0, 71, 1183)
                    ]
                },
                {
                    "date": "2024-03-02",
                    "astro": { "sunrise": "06:11 AM", "sunset": "05:39 PM" },
                    "hour": [
                        hour(1709337600, 1.0, 85, 1213),
                        hour(1709348400, -1.0, 90, 1213)
                    ]
                }
            ]
        }
    })
}

async fn mount(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(response)
        .mount(server)
        .await;
}

fn provider(server: &MockServer) -> WeatherApiProvider {
    WeatherApiProvider::with_base_url("WA_KEY".to_string(), server.uri())
}

#[tokio::test]
async fn current_uses_requested_units_and_astro_times() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(forecast_response()),
    )
    .await;

    let metric = provider(&server)
        .current(&WeatherRequest::new("Boston", Units::Celsius))
        .await
        .unwrap();

    assert_eq!(metric.location_name, "Boston, United States of America");
    assert_eq!(metric.status, "Partly cloudy");
    assert_eq!(metric.condition, WeatherCondition::Clouds);
    assert!((metric.temperature - 2.0).abs() < 1e-9);
    assert!((metric.wind_speed - 5.0).abs() < 1e-9);
    assert_eq!(
        metric.icon_url.as_deref(),
        Some("https://cdn.weatherapi.com/weather/64x64/day/116.png")
    );
    // local clock is UTC-5
    assert_eq!(
        metric.sunrise.map(|t| t.to_rfc3339()).as_deref(),
        Some("2024-03-01T11:13:00+00:00")
    );
    assert_eq!(
        metric.sunset.map(|t| t.to_rfc3339()).as_deref(),
        Some("2024-03-01T22:38:00+00:00")
    );

    let imperial = provider(&server)
        .current(&WeatherRequest::new("Boston", Units::Fahrenheit))
        .await
        .unwrap();

    assert!((imperial.temperature - 35.6).abs() < 1e-9);
    assert!((imperial.feels_like - 29.3).abs() < 1e-9);
    assert!((imperial.wind_speed - 11.2).abs() < 1e-9);
}

#[tokio::test]
async fn forecast_requests_five_days() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("key", "WA_KEY"))
        .and(query_param("q", "Boston"))
        .and(query_param("days", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_response()))
        .expect(1)
        .mount(&server)
        .await;

    let forecast = provider(&server)
        .forecast(&WeatherRequest::new("Boston", Units::Celsius))
        .await
        .unwrap();

    assert_eq!(forecast.entries.len(), 5);

    let days = aggregate(&forecast.samples());
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].temp_min, 2.0);
    assert_eq!(days[0].temp_max, 6.0);
    assert_eq!(days[0].humidity_repr, 71);
    assert_eq!(days[1].temp_min, -1.0);
    assert_eq!(days[1].humidity_repr, 90);

    let conditions: Vec<_> = forecast.conditions().collect();
    assert!(conditions.contains(&WeatherCondition::Rain));
    assert!(conditions.contains(&WeatherCondition::Snow));
}

#[tokio::test]
async fn forecast_in_fahrenheit_uses_temp_f() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(forecast_response()),
    )
    .await;

    let forecast = provider(&server)
        .forecast(&WeatherRequest::new("Boston", Units::Fahrenheit))
        .await
        .unwrap();

    let days = aggregate(&forecast.samples());
    assert!((days[0].temp_max - 42.8).abs() < 1e-9);
    assert!((days[1].temp_min - 30.2).abs() < 1e-9);
}

#[tokio::test]
async fn no_matching_location_is_location_not_found() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "code": 1006, "message": "No matching location found." }
        })),
    )
    .await;

    let err = provider(&server)
        .forecast(&WeatherRequest::new("Atlantis", Units::Celsius))
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ProviderError>(),
        Some(ProviderError::LocationNotFound { .. })
    ));
}

#[tokio::test]
async fn other_bad_request_is_api_error() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "code": 1003, "message": "Parameter q is missing." }
        })),
    )
    .await;

    let err = provider(&server)
        .forecast(&WeatherRequest::new("", Units::Celsius))
        .await
        .unwrap_err();

    match err.downcast_ref::<ProviderError>() {
        Some(ProviderError::Api { status, body, .. }) => {
            assert_eq!(status.as_u16(), 400);
            assert!(body.contains("Parameter q is missing"));
        }
        other => panic!("Expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn disabled_key_is_unauthorized() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": { "code": 2008, "message": "API key has been disabled." }
        })),
    )
    .await;

    let err = provider(&server)
        .current(&WeatherRequest::new("Boston", Units::Celsius))
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ProviderError>(),
        Some(ProviderError::Unauthorized { .. })
    ));
}

#[tokio::test]
async fn polar_astro_block_still_builds_dashboard() {
    let server = MockServer::start().await;
    let mut body = forecast_response();
    body["location"]["name"] = "Tromso".into();
    body["location"]["country"] = "Norway".into();
    for day in body["forecast"]["forecastday"].as_array_mut().unwrap() {
        day["astro"] = serde_json::json!({ "sunrise": "No sunrise", "sunset": "No sunset" });
    }
    mount(&server, ResponseTemplate::new(200).set_body_json(body)).await;

    let request = WeatherRequest::new("Tromso", Units::Celsius);
    let current = provider(&server).current(&request).await.unwrap();

    assert_eq!(current.sunrise, None);
    assert_eq!(current.sunset, None);

    let dash = load_dashboard(&provider(&server), &request).await.unwrap();

    assert_eq!(dash.current.location_name, "Tromso, Norway");
    assert_eq!(dash.days.len(), 2);
    assert_eq!(dash.alerts, vec![Alert::Clouds, Alert::Rain, Alert::Snow]);
}
