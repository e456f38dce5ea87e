//! Optional tidy-up passes over a daily frame: imputation, sparse-row removal and
//! scaling. None of them is part of [`build_dataset`](crate::build_dataset); callers apply
//! them to the finished dataset when a downstream model needs it.

use crate::features::completeness::cell_present;
use crate::features::error::FeatureError;
use crate::types::daily_frame::{is_numeric, DailyFrame};
use log::debug;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Scaling applied by [`DailyFrame::normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMethod {
    /// `(x - min) / (max - min)`, mapping the column onto `[0, 1]`.
    #[default]
    MinMax,
    /// `(x - mean) / std` with the population standard deviation.
    ZScore,
}

impl DailyFrame {
    /// Names of the columns a cleaning pass may rewrite: `cols` when given, otherwise every
    /// numeric non-boolean column. Absent and non-numeric names are skipped.
    fn cleanable<S: AsRef<str>>(&self, cols: &[S]) -> Vec<String> {
        let candidates: Vec<String> = if cols.is_empty() {
            self.column_names()
        } else {
            cols.iter().map(|c| c.as_ref().to_string()).collect()
        };
        candidates
            .into_iter()
            .filter(|name| {
                self.frame
                    .column(name)
                    .is_ok_and(|c| is_numeric(c.dtype()) && c.dtype() != &DataType::Boolean)
            })
            .collect()
    }

    /// Replaces missing values in `cols` with the median of each column's present values.
    ///
    /// An empty `cols` selects every numeric column. Filled columns become `Float64`.
    /// A column with no present value is left as it is.
    pub fn fill_missing_median<S: AsRef<str>>(self, cols: &[S]) -> Result<DailyFrame, FeatureError> {
        let mut daily = self;
        let mut fills = Vec::new();
        for name in daily.cleanable(cols) {
            let values = daily.float_series(&name)?;
            let missing = values.null_count();
            if missing == 0 || missing == values.len() {
                continue;
            }
            debug!("Filling {} missing values of {} with the median", missing, name);
            daily.frame.with_column(values)?;
            fills.push(col(name.as_str()).fill_null(col(name.as_str()).median()));
        }
        if fills.is_empty() {
            return Ok(daily);
        }
        daily.map_lazy(|frame| frame.with_columns(fills))
    }

    /// Keeps rows in which at least `threshold` of the cells are present.
    ///
    /// A row of `n` cells needs `ceil(threshold * n)` non-missing ones, so `0.0` keeps
    /// everything and `1.0` behaves like [`DailyFrame::drop_incomplete`].
    ///
    /// # Errors
    ///
    /// [`FeatureError::InvalidParameter`] if `threshold` is outside `0.0..=1.0`.
    pub fn drop_sparse_rows(self, threshold: f64) -> Result<DailyFrame, FeatureError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(FeatureError::InvalidParameter {
                name: "threshold",
                reason: format!("must be between 0 and 1, got {}", threshold),
            });
        }
        let width = self.frame.width();
        let required = (threshold * width as f64).ceil() as u32;
        let present_cells = self
            .frame
            .get_columns()
            .iter()
            .map(|c| cell_present(c.name().as_str(), c.dtype()).cast(DataType::UInt32))
            .reduce(|total, present| total + present)
            .unwrap_or(lit(0u32));
        let daily = self.map_lazy(|frame| frame.filter(present_cells.gt_eq(lit(required))))?;
        debug!(
            "Sparse-row filter kept {} rows needing {} of {} cells",
            daily.height(),
            required,
            width
        );
        Ok(daily)
    }

    /// Rescales `cols` in place with `method`; scaled columns become `Float64`.
    ///
    /// Columns that are absent, non-numeric, entirely missing or constant are left
    /// unchanged, and an empty `cols` changes nothing. Missing cells stay missing.
    pub fn normalize<S: AsRef<str>>(
        self,
        cols: &[S],
        method: NormalizeMethod,
    ) -> Result<DailyFrame, FeatureError> {
        let mut daily = self;
        let names = if cols.is_empty() {
            Vec::new()
        } else {
            daily.cleanable(cols)
        };
        let mut scaled = Vec::with_capacity(names.len());
        for name in names {
            let values = daily.float_series(&name)?;
            let floats = values.f64()?;
            let stats = match method {
                NormalizeMethod::MinMax => floats
                    .min()
                    .zip(floats.max())
                    .map(|(min, max)| (min, max - min)),
                NormalizeMethod::ZScore => floats.mean().zip(floats.std(0)),
            };
            let Some((offset, scale)) = stats else {
                continue;
            };
            if scale == 0.0 {
                debug!("Skipping constant column {}", name);
                continue;
            }
            daily.frame.with_column(values)?;
            scaled.push(((col(name.as_str()) - lit(offset)) / lit(scale)).alias(name.as_str()));
        }
        if scaled.is_empty() {
            return Ok(daily);
        }
        daily.map_lazy(|frame| frame.with_columns(scaled))
    }
}
