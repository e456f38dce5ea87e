//! The daily feature and label stages. Each one consumes a [`crate::DailyFrame`] and
//! returns a new one; feature and label stages only ever append columns.

pub mod calendar;
pub mod cleaning;
pub mod completeness;
pub mod error;
pub mod lags;
pub mod outliers;
pub mod resample;
pub mod rolling;
pub mod target;
