// hourly_frame.rs

//! Contains the `HourlyFrame` structure holding raw hourly observations before resampling.

use crate::features::error::FeatureError;
use crate::types::into_utc_trait::{parse_utc_timestamp, IntoUtcDateTime};
use chrono::{DateTime, SecondsFormat, Utc};
use log::warn;
use polars::prelude::*;

/// Column holding the observation timestamp.
pub const TIME_COL: &str = "time";
/// Column holding the 2 m air temperature in °C.
pub const TEMPERATURE_COL: &str = "temperature_2m";
/// Column holding the hourly precipitation in mm.
pub const PRECIPITATION_COL: &str = "precipitation";

/// One raw hourly reading, as delivered by a CSV export or the Open-Meteo API.
///
/// The timestamp is kept as text: parsing happens during resampling, where rows with an
/// unparseable timestamp are dropped instead of failing the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyObservation {
    pub time: String,
    pub temperature_2m: Option<f64>,
    pub precipitation: Option<f64>,
}

impl HourlyObservation {
    /// Creates an observation from raw timestamp text.
    ///
    /// # Arguments
    ///
    /// * `time` - ISO-8601 text; read as UTC when it carries no offset.
    /// * `temperature_2m` - Air temperature in °C, `None` when not reported.
    /// * `precipitation` - Precipitation in mm, `None` when not reported.
    pub fn new(
        time: impl Into<String>,
        temperature_2m: Option<f64>,
        precipitation: Option<f64>,
    ) -> Self {
        Self {
            time: time.into(),
            temperature_2m,
            precipitation,
        }
    }

    /// Builds an observation from a chrono instant, stored as an RFC 3339 UTC string.
    pub fn at(
        instant: impl IntoUtcDateTime,
        temperature_2m: Option<f64>,
        precipitation: Option<f64>,
    ) -> Self {
        let time = instant
            .into_utc()
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        Self::new(time, temperature_2m, precipitation)
    }
}

/// A wrapper around a Polars `DataFrame` holding hourly weather observations.
///
/// The frame carries at least the `time`, `temperature_2m` and `precipitation` columns.
/// `time` may be a string column (ISO-8601 text) or a Polars `Datetime` column; the
/// measurement columns may have any numeric dtype and are read as `f64`.
///
/// Instances are created from a raw frame with [`HourlyFrame::new`], from rows with
/// [`HourlyFrame::from_observations`], or by the dataset reader and the Open-Meteo client.
#[derive(Debug, Clone)]
pub struct HourlyFrame {
    /// The underlying Polars DataFrame containing the hourly rows.
    pub frame: DataFrame,
}

impl HourlyFrame {
    /// Wraps a `DataFrame`, checking that the required hourly columns are present.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::InvalidColumn`] naming the first missing column.
    pub fn new(frame: DataFrame) -> Result<Self, FeatureError> {
        for name in [TIME_COL, TEMPERATURE_COL, PRECIPITATION_COL] {
            if frame.get_column_index(name).is_none() {
                return Err(FeatureError::InvalidColumn(name.to_string()));
            }
        }
        let hourly = Self { frame };
        let negative = hourly
            .precipitation()?
            .iter()
            .filter(|v| matches!(v, Some(p) if *p < 0.0))
            .count();
        if negative > 0 {
            warn!(
                "{} hourly rows report negative precipitation; they will be treated as missing",
                negative
            );
        }
        Ok(hourly)
    }

    /// Builds a frame from individual observations, keeping their order.
    pub fn from_observations(observations: &[HourlyObservation]) -> Result<Self, FeatureError> {
        let time: Vec<&str> = observations.iter().map(|o| o.time.as_str()).collect();
        let temperature: Vec<Option<f64>> =
            observations.iter().map(|o| o.temperature_2m).collect();
        let precipitation: Vec<Option<f64>> =
            observations.iter().map(|o| o.precipitation).collect();
        let frame = df!(
            TIME_COL => time,
            TEMPERATURE_COL => temperature,
            PRECIPITATION_COL => precipitation,
        )?;
        Self::new(frame)
    }

    /// Number of hourly rows, malformed ones included.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// `true` when the frame holds no rows at all.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Parses the `time` column. Unparseable or null entries come back as `None`.
    pub(crate) fn timestamps(&self) -> Result<Vec<Option<DateTime<Utc>>>, FeatureError> {
        let column = self.frame.column(TIME_COL)?;
        match column.dtype() {
            DataType::Datetime(_, _) | DataType::Date => {
                let millis = column.cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
                Ok(millis
                    .datetime()?
                    .into_iter()
                    .map(|ms| ms.and_then(DateTime::from_timestamp_millis))
                    .collect())
            }
            _ => {
                let text = column.cast(&DataType::String)?;
                Ok(text
                    .str()?
                    .into_iter()
                    .map(|raw| raw.and_then(parse_utc_timestamp))
                    .collect())
            }
        }
    }

    /// Temperature readings, with NaN normalised to missing.
    pub(crate) fn temperatures(&self) -> Result<Vec<Option<f64>>, FeatureError> {
        float_values(&self.frame, TEMPERATURE_COL)
    }

    /// Precipitation readings, with NaN normalised to missing.
    pub(crate) fn precipitation(&self) -> Result<Vec<Option<f64>>, FeatureError> {
        float_values(&self.frame, PRECIPITATION_COL)
    }
}

fn float_values(frame: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, FeatureError> {
    let column = frame
        .column(name)
        .map_err(|_| FeatureError::InvalidColumn(name.to_string()))?
        .cast(&DataType::Float64)?;
    Ok(column
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_hourly_frame_requires_columns() -> Result<(), Box<dyn std::error::Error>> {
        let frame = df!(
            "time" => ["2024-01-01T00:00"],
            "temperature_2m" => [1.0],
        )?;
        match HourlyFrame::new(frame) {
            Err(FeatureError::InvalidColumn(name)) => assert_eq!(name, "precipitation"),
            other => panic!("expected InvalidColumn, got {:?}", other.map(|h| h.height())),
        }
        Ok(())
    }

    #[test]
    fn test_from_observations_keeps_missing_values() -> Result<(), Box<dyn std::error::Error>> {
        let hourly = HourlyFrame::from_observations(&[
            HourlyObservation::new("2024-01-01T00:00", Some(3.5), None),
            HourlyObservation::new("2024-01-01T01:00", None, Some(0.4)),
        ])?;
        assert_eq!(hourly.height(), 2);
        assert_eq!(hourly.temperatures()?, vec![Some(3.5), None]);
        assert_eq!(hourly.precipitation()?, vec![None, Some(0.4)]);
        Ok(())
    }

    #[test]
    fn test_timestamps_mark_malformed_rows() -> Result<(), Box<dyn std::error::Error>> {
        let hourly = HourlyFrame::from_observations(&[
            HourlyObservation::new("2024-01-01T05:00", Some(1.0), Some(0.0)),
            HourlyObservation::new("garbage", Some(2.0), Some(0.0)),
        ])?;
        let ts = hourly.timestamps()?;
        assert_eq!(ts[0], Some(Utc.with_ymd_and_hms(2024, 1, 1, 5, 0, 0).unwrap()));
        assert_eq!(ts[1], None);
        Ok(())
    }

    #[test]
    fn test_observation_at_formats_utc() {
        let instant = Utc.with_ymd_and_hms(2024, 7, 4, 9, 0, 0).unwrap();
        let obs = HourlyObservation::at(instant, Some(20.0), Some(0.0));
        assert_eq!(obs.time, "2024-07-04T09:00:00Z");
    }

    #[test]
    fn test_integer_columns_are_read_as_floats() -> Result<(), Box<dyn std::error::Error>> {
        let frame = df!(
            "time" => ["2024-01-01T00:00", "2024-01-01T01:00"],
            "temperature_2m" => [4i64, 6],
            "precipitation" => [0i64, 1],
        )?;
        let hourly = HourlyFrame::new(frame)?;
        assert_eq!(hourly.temperatures()?, vec![Some(4.0), Some(6.0)]);
        Ok(())
    }
}
