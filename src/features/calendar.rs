use crate::features::error::FeatureError;
use crate::types::daily_frame::DailyFrame;
use chrono::{Datelike, Weekday};
use polars::prelude::*;

/// Weekday, 0 (Monday) to 6 (Sunday).
pub const DAY_OF_WEEK_COL: &str = "day_of_week";
/// Month of the year, 1 to 12.
pub const MONTH_COL: &str = "month";
/// Ordinal day, 1 to 366.
pub const DAY_OF_YEAR_COL: &str = "day_of_year";
/// `true` on Saturday and Sunday.
pub const IS_WEEKEND_COL: &str = "is_weekend";

impl DailyFrame {
    /// Appends calendar-position features derived from each row's `date`:
    /// `day_of_week` (0 = Monday .. 6 = Sunday), `month` (1-12), `day_of_year` (1-366)
    /// and `is_weekend` (Saturday or Sunday).
    pub fn add_calendar_features(self) -> Result<DailyFrame, FeatureError> {
        let dates = self.dates()?;
        let day_of_week: Vec<i32> = dates
            .iter()
            .map(|d| d.weekday().num_days_from_monday() as i32)
            .collect();
        let month: Vec<i32> = dates.iter().map(|d| d.month() as i32).collect();
        let day_of_year: Vec<i32> = dates.iter().map(|d| d.ordinal() as i32).collect();
        let is_weekend: Vec<bool> = dates
            .iter()
            .map(|d| matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .collect();

        self.append(vec![
            Series::new(DAY_OF_WEEK_COL.into(), day_of_week),
            Series::new(MONTH_COL.into(), month),
            Series::new(DAY_OF_YEAR_COL.into(), day_of_year),
            Series::new(IS_WEEKEND_COL.into(), is_weekend),
        ])
    }
}
