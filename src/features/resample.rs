//! Hourly → daily resampling in a civil timezone.

use crate::features::error::FeatureError;
use crate::types::daily_frame::{
    DailyFrame, DailyRecord, DATE_COL, PRECIP_COL, TEMP_MAX_COL, TEMP_MEAN_COL, TEMP_MIN_COL,
};
use crate::types::hourly_frame::{HourlyFrame, PRECIPITATION_COL, TEMPERATURE_COL};
use chrono_tz::Tz;
use log::{debug, warn};
use polars::prelude::*;

const INSTANT_COL: &str = "instant_utc";
const HOURS_COL: &str = "hours";

pub(crate) fn parse_timezone(timezone: &str) -> Result<Tz, FeatureError> {
    timezone
        .parse::<Tz>()
        .map_err(|_| FeatureError::InvalidTimezone(timezone.to_string()))
}

/// Groups the hourly rows by local date. The result holds the daily frame columns plus
/// `hours`, sorted by date.
fn aggregate(hourly: &HourlyFrame, timezone: &str) -> Result<DataFrame, FeatureError> {
    let tz = parse_timezone(timezone)?;
    let millis = Int64Chunked::from_iter_options(
        INSTANT_COL.into(),
        hourly
            .timestamps()?
            .into_iter()
            .map(|instant| instant.map(|t| t.timestamp_millis())),
    );
    let malformed = millis.null_count();
    let instants = millis.into_datetime(TimeUnit::Milliseconds, Some("UTC".into()));
    let frame = DataFrame::new(vec![
        instants.into_series().into(),
        Column::new(TEMPERATURE_COL.into(), hourly.temperatures()?),
        Column::new(PRECIPITATION_COL.into(), hourly.precipitation()?),
    ])?;

    if malformed > 0 {
        warn!(
            "Dropped {} of {} hourly rows with an unparseable timestamp",
            malformed,
            hourly.height()
        );
    }

    let daily = frame
        .lazy()
        .filter(col(INSTANT_COL).is_not_null())
        .with_column(
            col(INSTANT_COL)
                .dt()
                .convert_time_zone(tz.name().into())
                .dt()
                .date()
                .alias(DATE_COL),
        )
        .group_by([col(DATE_COL)])
        .agg([
            col(TEMPERATURE_COL).max().alias(TEMP_MAX_COL),
            col(TEMPERATURE_COL).min().alias(TEMP_MIN_COL),
            col(TEMPERATURE_COL).mean().alias(TEMP_MEAN_COL),
            // Missing and negative readings add nothing, so an all-missing day sums to 0.0.
            col(PRECIPITATION_COL)
                .filter(col(PRECIPITATION_COL).gt_eq(lit(0.0)))
                .sum()
                .alias(PRECIP_COL),
            len().cast(DataType::UInt32).alias(HOURS_COL),
        ])
        .sort([DATE_COL], SortMultipleOptions::default())
        .collect()?;

    debug!(
        "Resampled {} hourly rows into {} days ({})",
        hourly.height() - malformed,
        daily.height(),
        tz
    );
    Ok(daily)
}

/// Aggregates hourly observations into one [`DailyRecord`] per local calendar day.
///
/// Timestamps are read as UTC, converted to `timezone` and bucketed by the resulting local
/// date. Rows whose timestamp cannot be parsed are dropped before aggregation. The result
/// is sorted ascending by date and contains only days that received at least one row.
///
/// Days with a daylight-saving transition keep whatever number of hours fell on them.
///
/// # Errors
///
/// [`FeatureError::InvalidTimezone`] if `timezone` is not an IANA zone name.
pub fn daily_records(
    hourly: &HourlyFrame,
    timezone: &str,
) -> Result<Vec<DailyRecord>, FeatureError> {
    let daily = DailyFrame::new(aggregate(hourly, timezone)?)?;
    let hours = daily.column(HOURS_COL)?.cast(&DataType::UInt32)?;
    let records = daily
        .dates()?
        .into_iter()
        .zip(daily.values(TEMP_MAX_COL)?)
        .zip(daily.values(TEMP_MIN_COL)?)
        .zip(daily.values(TEMP_MEAN_COL)?)
        .zip(daily.values(PRECIP_COL)?)
        .zip(hours.u32()?.into_iter())
        .map(
            |(((((date, temp_max), temp_min), temp_mean), precip_sum), hours)| DailyRecord {
                date,
                temp_max,
                temp_min,
                temp_mean,
                precip_sum,
                hours: hours.unwrap_or(0),
            },
        )
        .collect();
    Ok(records)
}

impl DailyFrame {
    /// Resamples an hourly frame into a daily frame in the civil `timezone`.
    ///
    /// The daily frame has the columns `date`, `temp_max_c`, `temp_min_c`, `temp_mean_c`
    /// and `precip_mm`. Temperature statistics are missing for a day without any valid
    /// temperature; precipitation is the sum of the readings that are present. The hourly
    /// frame is consumed.
    ///
    /// An empty hourly frame (or one whose rows are all malformed) yields an empty daily
    /// frame with the same schema.
    ///
    /// # Example
    ///
    /// ```
    /// use weather_features::{DailyFrame, HourlyFrame, HourlyObservation};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let hourly = HourlyFrame::from_observations(&[
    ///     HourlyObservation::new("2024-06-01T12:00", Some(10.0), Some(0.2)),
    ///     HourlyObservation::new("2024-06-01T13:00", Some(20.0), None),
    ///     HourlyObservation::new("2024-06-01T14:00", Some(15.0), Some(1.0)),
    /// ])?;
    /// let daily = DailyFrame::resample(hourly, "Europe/Amsterdam")?;
    /// assert_eq!(daily.height(), 1);
    /// assert_eq!(daily.values("temp_mean_c")?, vec![Some(15.0)]);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// [`FeatureError::InvalidTimezone`] for an unknown zone name.
    pub fn resample(hourly: HourlyFrame, timezone: &str) -> Result<DailyFrame, FeatureError> {
        let mut frame = aggregate(&hourly, timezone)?;
        let _ = frame.drop_in_place(HOURS_COL)?;
        DailyFrame::new(frame)
    }
}
