// daily_frame.rs

//! Contains the `DailyFrame` structure, the daily table every feature stage appends to.

use crate::features::error::FeatureError;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

/// Local calendar day of the row (Polars `Date`).
pub const DATE_COL: &str = "date";
/// Highest hourly temperature of the day, °C.
pub const TEMP_MAX_COL: &str = "temp_max_c";
/// Lowest hourly temperature of the day, °C.
pub const TEMP_MIN_COL: &str = "temp_min_c";
/// Mean of the day's hourly temperatures, °C.
pub const TEMP_MEAN_COL: &str = "temp_mean_c";
/// Total precipitation of the day, mm.
pub const PRECIP_COL: &str = "precip_mm";
/// Name of the supervised label appended by the target builders.
pub const TARGET_COL: &str = "target";

// Days between 0001-01-01 (CE day 1) and 1970-01-01, the Polars `Date` epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// One local calendar day aggregated from hourly observations.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_mean: Option<f64>,
    pub precip_sum: Option<f64>,
    /// Number of hourly observations that fell on this local day.
    pub hours: u32,
}

/// A wrapper around a Polars `DataFrame` holding one row per local calendar day.
///
/// The first column is always `date` (Polars `Date`), sorted ascending and unique. Feature
/// stages take the frame by value and hand back a new one with extra columns appended;
/// an existing column is never overwritten.
///
/// Missing cells are Polars nulls. They mark rows without enough history or future for a
/// lag, rolling window or target, and are removed once, at the end, by
/// [`DailyFrame::drop_incomplete`].
#[derive(Debug, Clone)]
pub struct DailyFrame {
    /// The underlying Polars DataFrame containing the daily rows.
    pub frame: DataFrame,
}

impl DailyFrame {
    /// Wraps a `DataFrame` whose `date` column can serve as the row index.
    ///
    /// Lags, rolling windows and targets address rows by position, so the dates must be
    /// present, strictly ascending and therefore unique. Nothing is reordered here: a frame
    /// out of order is rejected rather than silently sorted.
    ///
    /// # Arguments
    ///
    /// * `frame` - A frame holding a `date` column of dtype `Date`.
    ///
    /// # Returns
    ///
    /// The wrapped frame, unchanged.
    ///
    /// # Errors
    ///
    /// * [`FeatureError::InvalidColumn`] if `date` is missing.
    /// * [`FeatureError::InvalidDateIndex`] if `date` is not a `Date` column, holds a null,
    ///   or is not strictly ascending.
    ///
    /// # Example
    ///
    /// ```
    /// use polars::prelude::*;
    /// use weather_features::{DailyFrame, FeatureError};
    ///
    /// let days = Series::new("date".into(), [19_725i32, 19_723]).cast(&DataType::Date)?;
    /// let frame = DataFrame::new(vec![days.into()])?;
    /// assert!(matches!(
    ///     DailyFrame::new(frame),
    ///     Err(FeatureError::InvalidDateIndex(_))
    /// ));
    /// # Ok::<(), PolarsError>(())
    /// ```
    pub fn new(frame: DataFrame) -> Result<Self, FeatureError> {
        let date = frame
            .column(DATE_COL)
            .map_err(|_| FeatureError::InvalidColumn(DATE_COL.to_string()))?;
        if date.dtype() != &DataType::Date {
            return Err(FeatureError::InvalidDateIndex(format!(
                "'{}' has dtype {}, expected date",
                DATE_COL,
                date.dtype()
            )));
        }
        if date.null_count() > 0 {
            return Err(FeatureError::InvalidDateIndex(format!(
                "{} rows have no date",
                date.null_count()
            )));
        }
        let days = date.cast(&DataType::Int32)?;
        let days: Vec<i32> = days.i32()?.into_iter().flatten().collect();
        if let Some(pos) = days.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(FeatureError::InvalidDateIndex(format!(
                "dates must be strictly ascending, row {} is not after row {}",
                pos + 1,
                pos
            )));
        }
        Ok(Self { frame })
    }

    /// Builds the base daily table from aggregated records, which must already be in
    /// ascending date order.
    pub fn from_records(records: &[DailyRecord]) -> Result<Self, FeatureError> {
        let days: Vec<i32> = records
            .iter()
            .map(|r| r.date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
            .collect();
        let date = Series::new(DATE_COL.into(), days).cast(&DataType::Date)?;
        let frame = DataFrame::new(vec![
            date.into(),
            Column::new(
                TEMP_MAX_COL.into(),
                records.iter().map(|r| r.temp_max).collect::<Vec<_>>(),
            ),
            Column::new(
                TEMP_MIN_COL.into(),
                records.iter().map(|r| r.temp_min).collect::<Vec<_>>(),
            ),
            Column::new(
                TEMP_MEAN_COL.into(),
                records.iter().map(|r| r.temp_mean).collect::<Vec<_>>(),
            ),
            Column::new(
                PRECIP_COL.into(),
                records.iter().map(|r| r.precip_sum).collect::<Vec<_>>(),
            ),
        ])?;
        Self::new(frame)
    }

    /// Number of daily rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// `true` when no day survived.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Column names, in frame order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Unwraps the Polars frame.
    pub fn into_inner(self) -> DataFrame {
        self.frame
    }

    /// Runs a lazy query over the frame and wraps the result again, re-checking the date
    /// index.
    pub(crate) fn map_lazy(
        self,
        query: impl FnOnce(LazyFrame) -> LazyFrame,
    ) -> Result<Self, FeatureError> {
        let frame = query(self.frame.lazy()).collect()?;
        Self::new(frame)
    }

    /// The `date` column as chrono dates, one per row.
    pub fn dates(&self) -> Result<Vec<NaiveDate>, FeatureError> {
        let column = self.frame.column(DATE_COL)?.cast(&DataType::Int32)?;
        column
            .i32()?
            .into_iter()
            .map(|days| {
                days.and_then(|d| NaiveDate::from_num_days_from_ce_opt(d + UNIX_EPOCH_DAYS_FROM_CE))
                    .ok_or_else(|| FeatureError::InvalidDateIndex("date out of range".to_string()))
            })
            .collect()
    }

    /// Reads a numeric column as `f64`, with NaN normalised to missing.
    ///
    /// # Errors
    ///
    /// [`FeatureError::InvalidColumn`] if absent, [`FeatureError::NonNumericColumn`] if the
    /// dtype is not numeric.
    pub fn values(&self, name: &str) -> Result<Vec<Option<f64>>, FeatureError> {
        let column = self.column(name)?;
        if !is_numeric(column.dtype()) {
            return Err(FeatureError::NonNumericColumn {
                column: name.to_string(),
                dtype: column.dtype().to_string(),
            });
        }
        let floats = column.cast(&DataType::Float64)?;
        Ok(floats
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect())
    }

    /// [`DailyFrame::values`] as a `Float64` series named `name`.
    pub(crate) fn float_series(&self, name: &str) -> Result<Series, FeatureError> {
        Ok(Series::new(name.into(), self.values(name)?))
    }

    /// Looks up a column, mapping absence to [`FeatureError::InvalidColumn`].
    pub fn column(&self, name: &str) -> Result<&Column, FeatureError> {
        self.frame
            .column(name)
            .map_err(|_| FeatureError::InvalidColumn(name.to_string()))
    }

    /// Evaluates `exprs` against the frame and returns the resulting columns, one per
    /// expression, without modifying the frame.
    pub(crate) fn evaluate(&self, exprs: Vec<Expr>) -> Result<Vec<Series>, FeatureError> {
        select_series(self.frame.clone(), exprs)
    }

    /// Returns a new frame with `columns` appended on the right.
    ///
    /// Fails with [`FeatureError::DuplicateColumn`] if any name is already taken, either by
    /// an existing column or by another entry of `columns`.
    pub(crate) fn append(self, columns: Vec<Series>) -> Result<Self, FeatureError> {
        let mut seen: Vec<&str> = Vec::with_capacity(columns.len());
        for series in &columns {
            let name = series.name().as_str();
            if self.frame.get_column_index(name).is_some() || seen.contains(&name) {
                return Err(FeatureError::DuplicateColumn(name.to_string()));
            }
            seen.push(name);
        }
        let columns: Vec<Column> = columns.into_iter().map(Column::from).collect();
        let frame = self.frame.hstack(&columns)?;
        Ok(Self { frame })
    }
}

/// Runs a lazy `select` of `exprs` over `frame` and returns the output columns in order.
pub(crate) fn select_series(frame: DataFrame, exprs: Vec<Expr>) -> Result<Vec<Series>, FeatureError> {
    if exprs.is_empty() {
        return Ok(Vec::new());
    }
    let out = frame.lazy().select(exprs).collect()?;
    Ok(out
        .take_columns()
        .into_iter()
        .map(Column::take_materialized_series)
        .collect())
}

pub(crate) fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::UInt64
            | DataType::UInt32
            | DataType::Boolean
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: NaiveDate, temp: f64) -> DailyRecord {
        DailyRecord {
            date,
            temp_max: Some(temp + 5.0),
            temp_min: Some(temp - 5.0),
            temp_mean: Some(temp),
            precip_sum: Some(0.0),
            hours: 24,
        }
    }

    #[test]
    fn test_from_records_schema() -> Result<(), Box<dyn std::error::Error>> {
        let daily = DailyFrame::from_records(&[
            record(date(2024, 2, 28), 1.0),
            record(date(2024, 2, 29), 2.0),
        ])?;
        assert_eq!(
            daily.column_names(),
            vec!["date", "temp_max_c", "temp_min_c", "temp_mean_c", "precip_mm"]
        );
        assert_eq!(daily.frame.column("date")?.dtype(), &DataType::Date);
        assert_eq!(daily.dates()?, vec![date(2024, 2, 28), date(2024, 2, 29)]);
        assert_eq!(daily.values("temp_max_c")?, vec![Some(6.0), Some(7.0)]);
        Ok(())
    }

    #[test]
    fn test_dates_before_epoch() -> Result<(), Box<dyn std::error::Error>> {
        let daily = DailyFrame::from_records(&[record(date(1969, 12, 31), 0.0)])?;
        assert_eq!(daily.dates()?, vec![date(1969, 12, 31)]);
        Ok(())
    }

    #[test]
    fn test_values_rejects_unknown_and_non_numeric() -> Result<(), Box<dyn std::error::Error>> {
        let daily = DailyFrame::from_records(&[record(date(2024, 1, 1), 0.0)])?;
        assert!(matches!(
            daily.values("nope"),
            Err(FeatureError::InvalidColumn(name)) if name == "nope"
        ));
        assert!(matches!(
            daily.values("date"),
            Err(FeatureError::NonNumericColumn { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_append_refuses_to_overwrite() -> Result<(), Box<dyn std::error::Error>> {
        let daily = DailyFrame::from_records(&[record(date(2024, 1, 1), 0.0)])?;
        let clash = Series::new("temp_max_c".into(), [1.0]);
        assert!(matches!(
            daily.append(vec![clash]),
            Err(FeatureError::DuplicateColumn(name)) if name == "temp_max_c"
        ));
        Ok(())
    }

    fn frame_with_days(days: Vec<Option<i32>>) -> DataFrame {
        let date = Series::new(DATE_COL.into(), days)
            .cast(&DataType::Date)
            .unwrap();
        let n = date.len();
        DataFrame::new(vec![
            date.into(),
            Column::new(TEMP_MAX_COL.into(), (0..n).map(|i| i as f64).collect::<Vec<_>>()),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_rejects_unordered_dates() {
        // 2024-01-03, 2024-01-01, 2024-01-02: positional lags would leak the 3rd into the 1st.
        let result = DailyFrame::new(frame_with_days(vec![Some(19_725), Some(19_723), Some(19_724)]));
        assert!(matches!(result, Err(FeatureError::InvalidDateIndex(_))));
    }

    #[test]
    fn test_new_rejects_duplicate_and_null_dates() {
        assert!(matches!(
            DailyFrame::new(frame_with_days(vec![Some(19_723), Some(19_723)])),
            Err(FeatureError::InvalidDateIndex(_))
        ));
        assert!(matches!(
            DailyFrame::new(frame_with_days(vec![Some(19_723), None])),
            Err(FeatureError::InvalidDateIndex(_))
        ));
    }

    #[test]
    fn test_new_rejects_non_date_index() {
        let frame = df!(DATE_COL => ["2024-01-01"], TEMP_MAX_COL => [1.0]).unwrap();
        assert!(matches!(
            DailyFrame::new(frame),
            Err(FeatureError::InvalidDateIndex(_))
        ));
    }

    #[test]
    fn test_from_records_rejects_unsorted_records() {
        let result = DailyFrame::from_records(&[
            record(date(2024, 1, 3), 3.0),
            record(date(2024, 1, 1), 1.0),
        ]);
        assert!(matches!(result, Err(FeatureError::InvalidDateIndex(_))));
    }

    #[test]
    fn test_new_accepts_gaps() -> Result<(), Box<dyn std::error::Error>> {
        let daily = DailyFrame::new(frame_with_days(vec![Some(19_723), Some(19_730)]))?;
        assert_eq!(daily.dates()?, vec![date(2024, 1, 1), date(2024, 1, 8)]);
        Ok(())
    }

    #[test]
    fn test_empty_records_give_empty_frame() -> Result<(), Box<dyn std::error::Error>> {
        let daily = DailyFrame::from_records(&[])?;
        assert!(daily.is_empty());
        assert_eq!(daily.frame.width(), 5);
        Ok(())
    }
}
