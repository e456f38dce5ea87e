//! Outlier flags and winsorizing for a single daily column.
//!
//! Flags are appended as boolean columns next to the source; nothing is removed.
//! A missing cell is never flagged.

use crate::features::error::FeatureError;
use crate::types::daily_frame::{select_series, DailyFrame};
use log::debug;
use polars::prelude::*;

/// Name of the boolean column [`DailyFrame::flag_outliers_iqr`] appends for `col`.
pub fn iqr_flag_column_name(col: &str) -> String {
    format!("{}_outlier_iqr", col)
}

/// Name of the boolean column [`DailyFrame::flag_outliers_zscore`] appends for `col`.
pub fn zscore_flag_column_name(col: &str) -> String {
    format!("{}_outlier_z", col)
}

fn check_non_negative(name: &'static str, value: f64) -> Result<(), FeatureError> {
    if !value.is_finite() || value < 0.0 {
        return Err(FeatureError::InvalidParameter {
            name,
            reason: format!("must be a finite, non-negative number, got {}", value),
        });
    }
    Ok(())
}

fn quantile(values: &Float64Chunked, q: f64) -> Result<Option<f64>, FeatureError> {
    Ok(values.quantile(q, QuantileMethod::Linear)?)
}

impl DailyFrame {
    /// Appends a flag that is `true` where `col_name` lies outside the Tukey fences
    /// `[q1 - k * iqr, q3 + k * iqr]`, using linearly interpolated quartiles.
    ///
    /// A column without any present value flags nothing.
    ///
    /// # Errors
    ///
    /// * [`FeatureError::InvalidColumn`] / [`FeatureError::NonNumericColumn`] for a bad
    ///   `col_name`.
    /// * [`FeatureError::InvalidParameter`] if `k` is negative or not finite.
    /// * [`FeatureError::DuplicateColumn`] if the flag column already exists.
    pub fn flag_outliers_iqr(self, col_name: &str, k: f64) -> Result<DailyFrame, FeatureError> {
        check_non_negative("k", k)?;
        let values = self.float_series(col_name)?;
        let floats = values.f64()?;
        let fences = quantile(floats, 0.25)?
            .zip(quantile(floats, 0.75)?)
            .map(|(q1, q3)| (q1 - k * (q3 - q1), q3 + k * (q3 - q1)));
        let flag = match fences {
            Some((low, high)) => {
                debug!("IQR fences for {}: [{}, {}]", col_name, low, high);
                col(col_name).lt(lit(low)).or(col(col_name).gt(lit(high)))
            }
            None => col(col_name).is_not_null().and(lit(false)),
        };
        self.append_flag(values, flag, iqr_flag_column_name(col_name))
    }

    /// Appends a flag that is `true` where `|x - mean| / std > threshold`, with the
    /// population standard deviation.
    ///
    /// When the deviation is zero or undefined (a constant column, a single value or no
    /// present values) every row is `false`.
    ///
    /// # Errors
    ///
    /// * [`FeatureError::InvalidColumn`] / [`FeatureError::NonNumericColumn`] for a bad
    ///   `col_name`.
    /// * [`FeatureError::InvalidParameter`] if `threshold` is negative or not finite.
    /// * [`FeatureError::DuplicateColumn`] if the flag column already exists.
    pub fn flag_outliers_zscore(
        self,
        col_name: &str,
        threshold: f64,
    ) -> Result<DailyFrame, FeatureError> {
        check_non_negative("threshold", threshold)?;
        let values = self.float_series(col_name)?;
        let floats = values.f64()?;
        let moments = floats
            .mean()
            .zip(floats.std(0))
            .filter(|(_, sigma)| sigma.is_finite() && *sigma > 0.0);
        let flag = match moments {
            Some((mean, sigma)) => {
                let deviation = col(col_name) - lit(mean);
                deviation
                    .clone()
                    .gt(lit(threshold * sigma))
                    .or(deviation.lt(lit(-threshold * sigma)))
            }
            None => {
                debug!("{} has no spread; no z-score outliers", col_name);
                col(col_name).is_not_null().and(lit(false))
            }
        };
        self.append_flag(values, flag, zscore_flag_column_name(col_name))
    }

    /// Clips `col_name` to its `lower` and `upper` quantiles, in place. The column becomes
    /// `Float64`; missing cells stay missing and an all-missing column is left unchanged.
    ///
    /// # Errors
    ///
    /// * [`FeatureError::InvalidColumn`] / [`FeatureError::NonNumericColumn`] for a bad
    ///   `col_name`.
    /// * [`FeatureError::InvalidParameter`] unless `0 <= lower < upper <= 1`.
    pub fn winsorize(
        mut self,
        col_name: &str,
        lower: f64,
        upper: f64,
    ) -> Result<DailyFrame, FeatureError> {
        if !(0.0 <= lower && lower < upper && upper <= 1.0) {
            return Err(FeatureError::InvalidParameter {
                name: "quantiles",
                reason: format!("need 0 <= lower < upper <= 1, got {} and {}", lower, upper),
            });
        }
        let values = self.float_series(col_name)?;
        let floats = values.f64()?;
        let Some((low, high)) = quantile(floats, lower)?.zip(quantile(floats, upper)?) else {
            return Ok(self);
        };
        debug!("Winsorizing {} to [{}, {}]", col_name, low, high);
        self.frame.with_column(values)?;
        let clipped = when(col(col_name).lt(lit(low)))
            .then(lit(low))
            .when(col(col_name).gt(lit(high)))
            .then(lit(high))
            .otherwise(col(col_name))
            .alias(col_name);
        self.map_lazy(|frame| frame.with_column(clipped))
    }

    fn append_flag(self, values: Series, flag: Expr, name: String) -> Result<Self, FeatureError> {
        let source = DataFrame::new(vec![values.into()])?;
        let flags = select_series(source, vec![flag.fill_null(lit(false)).alias(name)])?;
        self.append(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::daily_frame::{DailyRecord, PRECIP_COL, TEMP_MAX_COL};
    use chrono::{Duration, NaiveDate};

    fn frame(temp_max: &[Option<f64>]) -> DailyFrame {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let records: Vec<DailyRecord> = temp_max
            .iter()
            .enumerate()
            .map(|(i, &t)| DailyRecord {
                date: start + Duration::days(i as i64),
                temp_max: t,
                temp_min: Some(0.0),
                temp_mean: Some(1.0),
                precip_sum: Some(0.0),
                hours: 24,
            })
            .collect();
        DailyFrame::from_records(&records).unwrap()
    }

    fn flags(daily: &DailyFrame, name: &str) -> Vec<Option<bool>> {
        daily
            .frame
            .column(name)
            .unwrap()
            .bool()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_iqr_flags_values_outside_fences() -> Result<(), Box<dyn std::error::Error>> {
        // Quartiles 2 and 4, so the fences at k = 1.5 are -1 and 7.
        let daily = frame(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(50.0), None])
            .flag_outliers_iqr(TEMP_MAX_COL, 1.5)?;
        assert_eq!(
            flags(&daily, "temp_max_c_outlier_iqr"),
            vec![
                Some(false),
                Some(false),
                Some(false),
                Some(false),
                Some(true),
                Some(false)
            ]
        );
        // The source column is untouched.
        assert_eq!(daily.values(TEMP_MAX_COL)?[4], Some(50.0));
        Ok(())
    }

    #[test]
    fn test_zscore_flags_distant_values() -> Result<(), Box<dyn std::error::Error>> {
        // Mean 4, population std 2 for [2, 2, 6, 6]: z = ±1.
        let daily = frame(&[Some(2.0), Some(2.0), Some(6.0), Some(6.0)])
            .flag_outliers_zscore(TEMP_MAX_COL, 0.5)?;
        assert_eq!(flags(&daily, "temp_max_c_outlier_z"), vec![Some(true); 4]);
        let daily = frame(&[Some(2.0), Some(2.0), Some(6.0), Some(6.0)])
            .flag_outliers_zscore(TEMP_MAX_COL, 1.0)?;
        assert_eq!(flags(&daily, "temp_max_c_outlier_z"), vec![Some(false); 4]);
        Ok(())
    }

    #[test]
    fn test_zscore_without_spread_flags_nothing() -> Result<(), Box<dyn std::error::Error>> {
        let constant = frame(&[Some(5.0), Some(5.0), Some(5.0)])
            .flag_outliers_zscore(TEMP_MAX_COL, 0.0)?;
        assert_eq!(flags(&constant, "temp_max_c_outlier_z"), vec![Some(false); 3]);

        let empty = frame(&[None, None]).flag_outliers_zscore(TEMP_MAX_COL, 3.0)?;
        assert_eq!(flags(&empty, "temp_max_c_outlier_z"), vec![Some(false); 2]);
        Ok(())
    }

    #[test]
    fn test_iqr_on_all_missing_column() -> Result<(), Box<dyn std::error::Error>> {
        let daily = frame(&[None, None, None]).flag_outliers_iqr(TEMP_MAX_COL, 1.5)?;
        assert_eq!(flags(&daily, "temp_max_c_outlier_iqr"), vec![Some(false); 3]);
        Ok(())
    }

    #[test]
    fn test_winsorize_clips_to_quantiles() -> Result<(), Box<dyn std::error::Error>> {
        let values: Vec<Option<f64>> = (0..=10).map(|v| Some(v as f64)).collect();
        let daily = frame(&values).winsorize(TEMP_MAX_COL, 0.1, 0.9)?;
        let clipped = daily.values(TEMP_MAX_COL)?;
        assert_eq!(clipped[0], Some(1.0));
        assert_eq!(clipped[5], Some(5.0));
        assert_eq!(clipped[10], Some(9.0));

        let with_gap = frame(&[Some(1.0), None, Some(3.0)]).winsorize(TEMP_MAX_COL, 0.0, 1.0)?;
        assert_eq!(with_gap.values(TEMP_MAX_COL)?, vec![Some(1.0), None, Some(3.0)]);
        Ok(())
    }

    #[test]
    fn test_winsorize_rejects_invalid_bounds() {
        let daily = frame(&[Some(1.0), Some(2.0)]);
        for (lower, upper) in [(0.5, 0.5), (0.9, 0.1), (-0.1, 0.9), (0.1, 1.1), (f64::NAN, 0.9)] {
            assert!(
                matches!(
                    daily.clone().winsorize(TEMP_MAX_COL, lower, upper),
                    Err(FeatureError::InvalidParameter { name: "quantiles", .. })
                ),
                "accepted ({}, {})",
                lower,
                upper
            );
        }
    }

    #[test]
    fn test_outlier_errors() {
        let daily = frame(&[Some(1.0)]);
        assert!(matches!(
            daily.clone().flag_outliers_iqr(TEMP_MAX_COL, -1.0),
            Err(FeatureError::InvalidParameter { name: "k", .. })
        ));
        assert!(matches!(
            daily.clone().flag_outliers_zscore("wind_speed", 3.0),
            Err(FeatureError::InvalidColumn(_))
        ));
        assert!(matches!(
            daily.clone().winsorize("date", 0.05, 0.95),
            Err(FeatureError::NonNumericColumn { .. })
        ));
        let flagged = daily.flag_outliers_iqr(PRECIP_COL, 1.5).unwrap();
        assert!(matches!(
            flagged.flag_outliers_iqr(PRECIP_COL, 1.5),
            Err(FeatureError::DuplicateColumn(_))
        ));
    }
}
