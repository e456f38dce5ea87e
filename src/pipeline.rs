//! End-to-end dataset construction: hourly observations in, a labelled daily table out.

use crate::error::PipelineError;
use crate::features::error::FeatureError;
use crate::features::rolling::RollingFunc;
use crate::io::dataset::{read_hourly_csv, write_dataset, DatasetPaths};
use crate::types::daily_frame::{DailyFrame, PRECIP_COL, TEMP_MAX_COL, TEMP_MEAN_COL};
use crate::types::hourly_frame::HourlyFrame;
use crate::types::task::Task;
use bon::Builder;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Options for one dataset build.
///
/// Every field has a default, so a JSON config only needs the keys it changes:
///
/// ```
/// use weather_features::{PipelineConfig, Task};
///
/// let config: PipelineConfig =
///     serde_json::from_str(r#"{"task": "clf_rain10_nextday", "windows": [7]}"#).unwrap();
/// assert_eq!(config.task, Task::ClassifyRain);
/// assert_eq!(config.windows, vec![7]);
/// assert_eq!(config.timezone, "America/New_York");
///
/// let config = PipelineConfig::builder().timezone("Europe/Amsterdam").horizon(2).build();
/// assert_eq!(config.lags, vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct PipelineConfig {
    /// IANA zone whose calendar days the hourly rows are grouped into.
    #[builder(into, default = "America/New_York".to_string())]
    pub timezone: String,
    #[builder(default)]
    pub task: Task,
    #[builder(default = vec![1, 2, 3])]
    pub lags: Vec<usize>,
    #[builder(default = vec![3, 7, 14])]
    pub windows: Vec<usize>,
    #[builder(default = vec![RollingFunc::Mean, RollingFunc::Max, RollingFunc::Sum])]
    pub rolling_funcs: Vec<RollingFunc>,
    /// Daily precipitation (mm) a day must exceed to count as rainy.
    #[builder(default = 10.0)]
    pub rain_threshold_mm: f64,
    /// How many days ahead the target looks.
    #[builder(default = 1)]
    pub horizon: usize,
    #[builder(default = vec![
        TEMP_MAX_COL.to_string(),
        TEMP_MEAN_COL.to_string(),
        PRECIP_COL.to_string(),
    ])]
    pub lag_columns: Vec<String>,
    #[builder(default = vec![TEMP_MAX_COL.to_string(), PRECIP_COL.to_string()])]
    pub rolling_columns: Vec<String>,
    /// Output files are named `<output_stem>_<label>.{csv,parquet}`; see
    /// [`PipelineConfig::dataset_stem`].
    #[builder(into, default = "weather_features".to_string())]
    pub output_stem: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PipelineConfig {
    /// Loads a config from a JSON file; missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, PipelineError> {
        let text = fs::read_to_string(path)
            .map_err(|e| PipelineError::ConfigRead(path.to_path_buf(), e))?;
        serde_json::from_str(&text).map_err(|e| PipelineError::ConfigParse(path.to_path_buf(), e))
    }

    /// File stem the dataset is written under.
    ///
    /// The label part names the target the way it was built: `nextday` for a horizon of
    /// one, `h<horizon>` otherwise, and the rain threshold in millimetres. The defaults
    /// therefore give the task slugs, e.g. `weather_features_clf_rain10_nextday`, while a
    /// 2-day, 15 mm rain label is written as `weather_features_clf_rain15_h2`.
    pub fn dataset_stem(&self) -> String {
        let ahead = match self.horizon {
            1 => "nextday".to_string(),
            h => format!("h{}", h),
        };
        let label = match self.task {
            Task::RegressionTempMax => format!("reg_temp_max_{}", ahead),
            Task::ClassifyRain => format!("clf_rain{}_{}", self.rain_threshold_mm, ahead),
        };
        format!("{}_{}", self.output_stem, label)
    }
}

/// Runs resampling, calendar features, lags, rolling windows, the task's target and the
/// completeness filter, in that order.
///
/// Lags and rolling statistics only see the current and earlier days; only the target
/// looks ahead. Rows left with a missing cell are dropped at the end, so the first
/// `max(lags, windows - 1)` days and the last `horizon` days never reach the output.
pub fn build_dataset(
    hourly: HourlyFrame,
    config: &PipelineConfig,
) -> Result<DailyFrame, FeatureError> {
    let daily = DailyFrame::resample(hourly, &config.timezone)?;
    let resampled_days = daily.height();
    let daily = daily
        .add_calendar_features()?
        .add_lags(&config.lag_columns, &config.lags)?
        .add_rollings(&config.rolling_columns, &config.windows, &config.rolling_funcs)?;
    let labelled = match config.task {
        Task::RegressionTempMax => daily.make_regression_target(TEMP_MAX_COL, config.horizon)?,
        Task::ClassifyRain => daily.make_rain_label(config.rain_threshold_mm, config.horizon)?,
    };
    let dataset = labelled.drop_incomplete()?;
    info!(
        "Built {} dataset: {} of {} days, {} columns",
        config.task,
        dataset.height(),
        resampled_days,
        dataset.frame.width()
    );
    Ok(dataset)
}

/// Reads an hourly CSV, builds the dataset and writes it as CSV and Parquet into
/// `out_dir`.
pub fn run_pipeline(
    config: &PipelineConfig,
    input: &Path,
    out_dir: &Path,
) -> Result<DatasetPaths, PipelineError> {
    let hourly = read_hourly_csv(input)?;
    let dataset = build_dataset(hourly, config)?;
    Ok(write_dataset(&dataset, out_dir, &config.dataset_stem())?)
}
