//! Provides the `OpenMeteoClient` for downloading hourly observations from the Open-Meteo
//! forecast API.
//!
//! The client always asks for GMT timestamps, so the frame it returns holds true UTC
//! instants; conversion to the civil timezone happens later, in
//! [`DailyFrame::resample`](crate::DailyFrame::resample).

use crate::clients::error::FetchError;
use crate::types::hourly_frame::{HourlyFrame, HourlyObservation};
use bon::bon;
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;

/// Public forecast endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct HourlyBlock {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
}

/// Decodes an Open-Meteo forecast response body into an [`HourlyFrame`].
///
/// Only the `hourly.time`, `hourly.temperature_2m` and `hourly.precipitation` arrays are
/// read; `null` entries become missing values. A response without an `hourly` block
/// yields an empty frame.
///
/// # Errors
///
/// * [`FetchError::Decode`] if the body is not valid JSON of the expected shape.
/// * [`FetchError::LengthMismatch`] if a measurement array is not as long as `time`.
///
/// # Example
///
/// ```
/// use weather_features::parse_forecast_json;
///
/// let body = br#"{"hourly": {
///     "time": ["2024-05-01T00:00", "2024-05-01T01:00"],
///     "temperature_2m": [11.2, null],
///     "precipitation": [0.0, 0.4]
/// }}"#;
/// let hourly = parse_forecast_json(body)?;
/// assert_eq!(hourly.height(), 2);
/// # Ok::<(), weather_features::FetchError>(())
/// ```
pub fn parse_forecast_json(body: &[u8]) -> Result<HourlyFrame, FetchError> {
    let response: ForecastResponse = serde_json::from_slice(body)?;
    let hourly = response.hourly.unwrap_or_default();
    let expected = hourly.time.len();
    for (field, found) in [
        ("temperature_2m", hourly.temperature_2m.len()),
        ("precipitation", hourly.precipitation.len()),
    ] {
        if found != expected {
            return Err(FetchError::LengthMismatch {
                field,
                expected,
                found,
            });
        }
    }

    let observations: Vec<HourlyObservation> = hourly
        .time
        .into_iter()
        .zip(hourly.temperature_2m)
        .zip(hourly.precipitation)
        .map(|((time, temperature), precipitation)| {
            HourlyObservation::new(time, temperature, precipitation)
        })
        .collect();
    Ok(HourlyFrame::from_observations(&observations)?)
}

/// Thin async client for the Open-Meteo forecast endpoint.
///
/// # Example
///
/// ```no_run
/// # use weather_features::{FetchError, OpenMeteoClient};
/// # #[tokio::main]
/// # async fn main() -> Result<(), FetchError> {
/// let client = OpenMeteoClient::new();
/// let hourly = client
///     .fetch_hourly()
///     .latitude(40.7128)
///     .longitude(-74.0060)
///     .past_days(30)
///     .call()
///     .await?;
/// println!("{}", hourly.frame);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new()
    }
}

#[bon]
impl OpenMeteoClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client talking to a different endpoint, such as a self-hosted instance.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetches hourly temperature and precipitation around a coordinate.
    ///
    /// # Optional Builder Methods
    ///
    /// * `.forecast_days(u32)`: days of forecast to include (default 7).
    /// * `.past_days(u32)`: days of history before today to include (default 0).
    ///
    /// # Errors
    ///
    /// [`FetchError::NetworkRequest`] if the request cannot be sent or the body cannot be
    /// read, [`FetchError::HttpStatus`] for a non-success status, and the errors of
    /// [`parse_forecast_json`] for an unexpected body.
    #[builder]
    pub async fn fetch_hourly(
        &self,
        latitude: f64,
        longitude: f64,
        #[builder(default = 7)] forecast_days: u32,
        #[builder(default = 0)] past_days: u32,
    ) -> Result<HourlyFrame, FetchError> {
        let url = format!(
            "{}?latitude={}&longitude={}&hourly=temperature_2m,precipitation&timezone=GMT&forecast_days={}&past_days={}",
            self.base_url, latitude, longitude, forecast_days, past_days
        );
        debug!("Requesting {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.clone(), e))?;
        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                return Err(match e.status() {
                    Some(status) => FetchError::HttpStatus {
                        url,
                        status,
                        source: e,
                    },
                    None => FetchError::NetworkRequest(url, e),
                });
            }
        };
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.clone(), e))?;
        let hourly = parse_forecast_json(&body)?;
        info!(
            "Fetched {} hourly rows for ({}, {})",
            hourly.height(),
            latitude,
            longitude
        );
        Ok(hourly)
    }
}
