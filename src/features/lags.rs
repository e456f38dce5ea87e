use crate::features::error::FeatureError;
use crate::types::daily_frame::DailyFrame;
use log::debug;
use polars::prelude::*;
use std::collections::BTreeSet;

/// Name of the column holding `col` lagged by `lag` rows.
pub fn lag_column_name(col: &str, lag: usize) -> String {
    format!("{}_lag{}", col, lag)
}

impl DailyFrame {
    /// Appends lagged copies of `cols`.
    ///
    /// For each column (in the given order) and each distinct lag `k` (ascending), adds
    /// `<col>_lag<k>` whose value at row `i` is the source value at row `i - k`. Rows are
    /// addressed by sorted position, so calendar gaps are not backfilled. The first `k`
    /// rows of each lag column are missing. Every lag reads the source column as it was
    /// before this call, never an already shifted copy. The source dtype is preserved.
    ///
    /// # Arguments
    ///
    /// * `cols` - Source columns, e.g. [`TEMP_MAX_COL`](crate::TEMP_MAX_COL); a repeated
    ///   name is lagged once.
    /// * `lags` - Row offsets; duplicates are ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use weather_features::{DailyFrame, DailyRecord, TEMP_MAX_COL};
    /// use chrono::NaiveDate;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let records: Vec<DailyRecord> = [10.0, 12.0, 15.0]
    ///     .iter()
    ///     .zip(1..)
    ///     .map(|(&t, day)| DailyRecord {
    ///         date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
    ///         temp_max: Some(t),
    ///         temp_min: Some(t - 5.0),
    ///         temp_mean: Some(t - 2.5),
    ///         precip_sum: Some(0.0),
    ///         hours: 24,
    ///     })
    ///     .collect();
    /// let daily = DailyFrame::from_records(&records)?.add_lags(&[TEMP_MAX_COL], &[1])?;
    /// assert_eq!(daily.values("temp_max_c_lag1")?, vec![None, Some(10.0), Some(12.0)]);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// * [`FeatureError::InvalidColumn`] if a column is absent.
    /// * [`FeatureError::InvalidParameter`] if a lag is zero.
    /// * [`FeatureError::DuplicateColumn`] if a lag column already exists.
    pub fn add_lags<S: AsRef<str>>(
        self,
        cols: &[S],
        lags: &[usize],
    ) -> Result<DailyFrame, FeatureError> {
        if lags.contains(&0) {
            return Err(FeatureError::InvalidParameter {
                name: "lags",
                reason: "lag offsets must be positive".to_string(),
            });
        }
        let lags: BTreeSet<usize> = lags.iter().copied().collect();

        let mut exprs = Vec::with_capacity(cols.len() * lags.len());
        let mut seen: Vec<&str> = Vec::with_capacity(cols.len());
        for col_name in cols {
            let col_name = col_name.as_ref();
            self.column(col_name)?;
            if seen.contains(&col_name) {
                continue;
            }
            seen.push(col_name);
            for &lag in &lags {
                exprs.push(
                    col(col_name)
                        .shift(lit(lag as i64))
                        .alias(lag_column_name(col_name, lag)),
                );
            }
        }
        let lagged = self.evaluate(exprs)?;
        debug!("Adding {} lag columns", lagged.len());
        self.append(lagged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::daily_frame::{DailyRecord, TEMP_MAX_COL};
    use chrono::{Duration, NaiveDate};

    fn frame_with_temp_max(values: &[Option<f64>]) -> DailyFrame {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let records: Vec<DailyRecord> = values
            .iter()
            .enumerate()
            .map(|(i, &v)| DailyRecord {
                date: start + Duration::days(i as i64),
                temp_max: v,
                temp_min: Some(0.0),
                temp_mean: Some(0.0),
                precip_sum: Some(i as f64),
                hours: 24,
            })
            .collect();
        DailyFrame::from_records(&records).unwrap()
    }

    #[test]
    fn test_lag_values() -> Result<(), Box<dyn std::error::Error>> {
        let daily = frame_with_temp_max(&[Some(10.0), Some(12.0), Some(15.0), Some(9.0), Some(11.0)])
            .add_lags(&[TEMP_MAX_COL], &[1, 2])?;
        assert_eq!(
            daily.values("temp_max_c_lag1")?,
            vec![None, Some(10.0), Some(12.0), Some(15.0), Some(9.0)]
        );
        assert_eq!(
            daily.values("temp_max_c_lag2")?,
            vec![None, None, Some(10.0), Some(12.0), Some(15.0)]
        );
        // Source column untouched.
        assert_eq!(
            daily.values("temp_max_c")?,
            vec![Some(10.0), Some(12.0), Some(15.0), Some(9.0), Some(11.0)]
        );
        Ok(())
    }

    #[test]
    fn test_lags_use_pre_call_snapshot() -> Result<(), Box<dyn std::error::Error>> {
        // Lag 1 and lag 2 requested in one call must both shift the original values,
        // so lag2 is never lag1 shifted once more from an already shifted column.
        let daily = frame_with_temp_max(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0)])
            .add_lags(&[TEMP_MAX_COL], &[2, 1, 2])?;
        let names = daily.column_names();
        assert_eq!(&names[names.len() - 2..], ["temp_max_c_lag1", "temp_max_c_lag2"]);
        assert_eq!(
            daily.values("temp_max_c_lag2")?,
            vec![None, None, Some(1.0), Some(2.0)]
        );
        Ok(())
    }

    #[test]
    fn test_lag_propagates_missing_source() -> Result<(), Box<dyn std::error::Error>> {
        let daily = frame_with_temp_max(&[Some(1.0), None, Some(3.0)])
            .add_lags(&[TEMP_MAX_COL], &[1])?;
        assert_eq!(daily.values("temp_max_c_lag1")?, vec![None, Some(1.0), None]);
        Ok(())
    }

    #[test]
    fn test_lag_longer_than_series_is_all_missing() -> Result<(), Box<dyn std::error::Error>> {
        let daily = frame_with_temp_max(&[Some(1.0), Some(2.0)]).add_lags(&["precip_mm"], &[5])?;
        assert_eq!(daily.values("precip_mm_lag5")?, vec![None, None]);
        Ok(())
    }

    #[test]
    fn test_lag_rejects_zero_and_unknown_column() {
        let daily = frame_with_temp_max(&[Some(1.0)]);
        assert!(matches!(
            daily.clone().add_lags(&[TEMP_MAX_COL], &[0]),
            Err(FeatureError::InvalidParameter { name: "lags", .. })
        ));
        assert!(matches!(
            daily.add_lags(&["humidity"], &[1]),
            Err(FeatureError::InvalidColumn(name)) if name == "humidity"
        ));
    }

    #[test]
    fn test_lag_feature_ignores_future_rows() -> Result<(), Box<dyn std::error::Error>> {
        let base = [Some(5.0), Some(6.0), Some(7.0), Some(8.0), Some(9.0)];
        let mut mutated = base;
        mutated[3] = Some(-100.0);
        mutated[4] = None;
        let a = frame_with_temp_max(&base).add_lags(&[TEMP_MAX_COL], &[1, 2])?;
        let b = frame_with_temp_max(&mutated).add_lags(&[TEMP_MAX_COL], &[1, 2])?;
        for name in ["temp_max_c_lag1", "temp_max_c_lag2"] {
            assert_eq!(a.values(name)?[..=2], b.values(name)?[..=2]);
        }
        Ok(())
    }
}
