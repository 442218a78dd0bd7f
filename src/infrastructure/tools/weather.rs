//! Weather lookup against the Open-Meteo public API
//!
//! Two hops: geocode the location name, then fetch the current forecast for
//! the returned coordinates. Both go through the injected HTTP client seam.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::domain::schema::names;
use crate::domain::tool::{ToolArguments, ToolExecutor};
use crate::domain::DomainError;
use crate::infrastructure::llm::http_client::HttpClientTrait;

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// WMO weather interpretation codes, reduced to a readable label
fn describe_weather_code(code: i64) -> &'static str {
    match code {
        0 => "clear sky",
        1..=3 => "partly cloudy",
        45 | 48 => "fog",
        51..=57 => "drizzle",
        61..=67 => "rain",
        71..=77 => "snow",
        80..=82 => "rain showers",
        85 | 86 => "snow showers",
        95..=99 => "thunderstorm",
        _ => "unknown conditions",
    }
}

#[derive(Debug)]
pub struct WeatherTool {
    client: Arc<dyn HttpClientTrait>,
}

impl WeatherTool {
    pub fn new(client: Arc<dyn HttpClientTrait>) -> Self {
        Self { client }
    }

    async fn geocode(&self, location: &str) -> Result<(f64, f64, String), DomainError> {
        let url = format!(
            "{}?name={}&count=1",
            GEOCODING_URL,
            urlencoding::encode(location)
        );
        let response = self.client.get_json(&url).await.map_err(|e| {
            DomainError::tool_execution("get_weather", format!("geocoding failed: {}", e))
        })?;

        let result = response
            .get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .ok_or_else(|| {
                DomainError::tool_execution(
                    "get_weather",
                    format!("no location found for '{}'", location),
                )
            })?;

        let latitude = result.get("latitude").and_then(Value::as_f64);
        let longitude = result.get("longitude").and_then(Value::as_f64);
        let name = result
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(location)
            .to_string();

        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Ok((lat, lon, name)),
            _ => Err(DomainError::tool_execution(
                "get_weather",
                "geocoding result is missing coordinates",
            )),
        }
    }
}

#[async_trait]
impl ToolExecutor for WeatherTool {
    fn name(&self) -> &'static str {
        "get_weather"
    }

    fn description(&self) -> &'static str {
        "Get the current weather for a location"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City or place name, e.g. 'Oslo'"
                }
            },
            "required": ["location"],
            "additionalProperties": false
        })
    }

    fn result_schema(&self) -> &'static str {
        names::WEATHER_REPORT
    }

    async fn execute(&self, args: ToolArguments) -> Result<Value, DomainError> {
        let location = args.require_str("location", 0)?;
        let (latitude, longitude, resolved_name) = self.geocode(location).await?;

        let url = format!(
            "{}?latitude={}&longitude={}&current=temperature_2m,weather_code",
            FORECAST_URL, latitude, longitude
        );
        let response = self.client.get_json(&url).await.map_err(|e| {
            DomainError::tool_execution("get_weather", format!("forecast failed: {}", e))
        })?;

        let current = response.get("current").ok_or_else(|| {
            DomainError::tool_execution("get_weather", "forecast response has no current block")
        })?;

        let temperature = current
            .get("temperature_2m")
            .and_then(Value::as_f64)
            .ok_or_else(|| {
                DomainError::tool_execution("get_weather", "forecast response has no temperature")
            })?;
        let conditions = current
            .get("weather_code")
            .and_then(Value::as_i64)
            .map(describe_weather_code);

        let mut report = json!({
            "location": resolved_name,
            "temperature_celsius": temperature,
        });
        if let Some(conditions) = conditions {
            report["conditions"] = json!(conditions);
        }
        Ok(report)
    }
}
