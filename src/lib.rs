mod clients;
mod error;
mod features;
mod io;
mod pipeline;
mod types;

pub use error::PipelineError;
pub use pipeline::*;

pub use clients::error::FetchError;
pub use clients::open_meteo::*;

pub use features::calendar::*;
pub use features::cleaning::NormalizeMethod;
pub use features::error::FeatureError;
pub use features::lags::lag_column_name;
pub use features::outliers::{iqr_flag_column_name, zscore_flag_column_name};
pub use features::resample::daily_records;
pub use features::rolling::{rolling_column_name, RollingFunc};

pub use io::dataset::*;
pub use io::error::DatasetIoError;

pub use types::daily_frame::*;
pub use types::hourly_frame::*;
pub use types::into_utc_trait::{parse_utc_timestamp, IntoUtcDateTime};
pub use types::task::Task;
