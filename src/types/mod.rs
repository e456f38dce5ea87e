pub mod daily_frame;
pub mod hourly_frame;
pub mod into_utc_trait;
pub mod task;
