//! Forward-looking supervised labels.
//!
//! These are the only stages that read rows after the current one, and what they read
//! lands in the `target` column alone.

use crate::features::error::FeatureError;
use crate::types::daily_frame::{DailyFrame, PRECIP_COL, TARGET_COL};
use polars::prelude::*;

fn check_horizon(horizon: usize) -> Result<(), FeatureError> {
    if horizon == 0 {
        return Err(FeatureError::InvalidParameter {
            name: "horizon",
            reason: "the target must look at least one day ahead".to_string(),
        });
    }
    Ok(())
}

impl DailyFrame {
    /// Appends `target` = `base_col` observed `horizon` rows later.
    ///
    /// The last `horizon` rows have no future row and are missing. The base column's
    /// dtype is preserved.
    ///
    /// # Errors
    ///
    /// [`FeatureError::InvalidColumn`] if `base_col` is absent,
    /// [`FeatureError::InvalidParameter`] if `horizon` is zero.
    pub fn make_regression_target(
        self,
        base_col: &str,
        horizon: usize,
    ) -> Result<DailyFrame, FeatureError> {
        check_horizon(horizon)?;
        let target = self
            .column(base_col)?
            .as_materialized_series()
            .shift(-(horizon as i64))
            .with_name(TARGET_COL.into());
        self.append(vec![target])
    }

    /// Appends a binary `target`: 1 if `precip_mm` observed `horizon` rows later exceeds
    /// `threshold_mm`, else 0.
    ///
    /// The label is missing when the future row does not exist or its precipitation is
    /// missing or negative.
    ///
    /// # Errors
    ///
    /// [`FeatureError::InvalidColumn`] if `precip_mm` is absent,
    /// [`FeatureError::InvalidParameter`] if `horizon` is zero or `threshold_mm` is not
    /// finite.
    pub fn make_rain_label(
        self,
        threshold_mm: f64,
        horizon: usize,
    ) -> Result<DailyFrame, FeatureError> {
        check_horizon(horizon)?;
        if !threshold_mm.is_finite() {
            return Err(FeatureError::InvalidParameter {
                name: "threshold_mm",
                reason: format!("must be a finite number of millimetres, got {}", threshold_mm),
            });
        }
        let precip = self.values(PRECIP_COL)?;
        let labels: Vec<Option<i32>> = (0..precip.len())
            .map(|i| {
                i.checked_add(horizon)
                    .and_then(|future| precip.get(future))
                    .copied()
                    .flatten()
                    .filter(|p| *p >= 0.0)
                    .map(|p| i32::from(p > threshold_mm))
            })
            .collect();
        self.append(vec![Series::new(TARGET_COL.into(), labels)])
    }
}
