use crate::features::error::FeatureError;
use crate::types::daily_frame::DailyFrame;
use log::info;
use polars::prelude::*;

/// Whether the cell of column `name` is present: not null, and not NaN for floats.
pub(crate) fn cell_present(name: &str, dtype: &DataType) -> Expr {
    let not_null = col(name).is_not_null();
    if dtype.is_float() {
        not_null.and(col(name).is_not_nan().fill_null(lit(false)))
    } else {
        not_null
    }
}

impl DailyFrame {
    /// Drops every row holding a missing value (null, or NaN in a float column) in any
    /// column.
    ///
    /// This is what turns cells left missing for lack of history or future into rows absent
    /// from the training set, so it belongs after all features and the target are built.
    /// Applying it twice gives the same rows as applying it once.
    pub fn drop_incomplete(self) -> Result<DailyFrame, FeatureError> {
        let height = self.height();
        let complete = self
            .frame
            .get_columns()
            .iter()
            .map(|c| cell_present(c.name().as_str(), c.dtype()))
            .reduce(|all, present| all.and(present))
            .unwrap_or(lit(true));
        let daily = self.map_lazy(|frame| frame.filter(complete))?;

        if daily.height() < height {
            info!(
                "Completeness filter dropped {} of {} daily rows",
                height - daily.height(),
                height
            );
        }
        Ok(daily)
    }
}
