//! Trailing-window statistics.

use crate::features::error::FeatureError;
use crate::types::daily_frame::{select_series, DailyFrame};
use log::debug;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Aggregation applied over a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollingFunc {
    Mean,
    Max,
    Min,
    Sum,
    /// Sample standard deviation (n - 1 denominator).
    Std,
    Median,
}

impl RollingFunc {
    pub(crate) fn suffix(&self) -> &'static str {
        match self {
            RollingFunc::Mean => "mean",
            RollingFunc::Max => "max",
            RollingFunc::Min => "min",
            RollingFunc::Sum => "sum",
            RollingFunc::Std => "std",
            RollingFunc::Median => "median",
        }
    }
}

/// Formats a `RollingFunc` using its column suffix.
///
/// # Examples
///
/// ```
/// use weather_features::RollingFunc;
///
/// assert_eq!(RollingFunc::Mean.to_string(), "mean");
/// ```
impl fmt::Display for RollingFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// Name of the column holding `func` over a trailing `window` of `col`.
pub fn rolling_column_name(col: &str, window: usize, func: RollingFunc) -> String {
    format!("{}_{}_{}", col, window, func)
}

/// `func` over the inclusive trailing `window` ending at each row of `source`.
///
/// `min_periods` equals the window, so leading rows and any window holding a missing
/// value come out null.
fn trailing(source: &str, window: usize, func: RollingFunc) -> Expr {
    let options = RollingOptionsFixedWindow {
        window_size: window,
        min_periods: window,
        weights: None,
        center: false,
        fn_params: None,
    };
    let values = col(source);
    match func {
        RollingFunc::Mean => values.rolling_mean(options),
        RollingFunc::Max => values.rolling_max(options),
        RollingFunc::Min => values.rolling_min(options),
        RollingFunc::Sum => values.rolling_sum(options),
        RollingFunc::Std => values.rolling_std(options),
        RollingFunc::Median => values.rolling_median(options),
    }
}

impl DailyFrame {
    /// Appends trailing-window statistics of `cols`.
    ///
    /// For each column, each distinct window `w` (ascending) and each distinct function,
    /// adds `<col>_<w>_<func>` whose value at row `i` is the function over rows
    /// `i - w + 1 ..= i`. Row `i + 1` and later never contribute. Rows before `w - 1`
    /// have no full window and are missing, as is any window containing a missing value.
    /// All outputs are computed from the source columns as they were before this call.
    ///
    /// # Errors
    ///
    /// * [`FeatureError::InvalidColumn`] if a column is absent.
    /// * [`FeatureError::NonNumericColumn`] if a column is not numeric.
    /// * [`FeatureError::InvalidParameter`] if a window is zero.
    /// * [`FeatureError::DuplicateColumn`] if an output column already exists.
    pub fn add_rollings<S: AsRef<str>>(
        self,
        cols: &[S],
        windows: &[usize],
        funcs: &[RollingFunc],
    ) -> Result<DailyFrame, FeatureError> {
        if windows.contains(&0) {
            return Err(FeatureError::InvalidParameter {
                name: "windows",
                reason: "window sizes must be positive".to_string(),
            });
        }
        let windows: BTreeSet<usize> = windows.iter().copied().collect();
        let mut unique_funcs: Vec<RollingFunc> = Vec::with_capacity(funcs.len());
        for func in funcs {
            if !unique_funcs.contains(func) {
                unique_funcs.push(*func);
            }
        }

        let mut sources: Vec<Column> = Vec::with_capacity(cols.len());
        let mut exprs = Vec::new();
        // The sample std of a single value is undefined.
        let mut undefined = Vec::new();
        for col_name in cols {
            let col_name = col_name.as_ref();
            if sources.iter().any(|c| c.name().as_str() == col_name) {
                continue;
            }
            sources.push(self.float_series(col_name)?.into());
            for &window in &windows {
                for &func in &unique_funcs {
                    let name = rolling_column_name(col_name, window, func);
                    if func == RollingFunc::Std && window == 1 {
                        undefined.push(name.clone());
                    }
                    exprs.push(trailing(col_name, window, func).alias(name));
                }
            }
        }

        let height = self.height();
        let columns: Vec<Series> = select_series(DataFrame::new(sources)?, exprs)?
            .into_iter()
            .map(|series| {
                if undefined.iter().any(|n| n.as_str() == series.name().as_str()) {
                    Series::full_null(series.name().clone(), height, &DataType::Float64)
                } else {
                    series
                }
            })
            .collect();
        debug!("Adding {} rolling columns", columns.len());
        self.append(columns)
    }
}
