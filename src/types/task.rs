//! Defines the supervised learning task a dataset is built for.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The label the pipeline attaches to each daily row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Task {
    /// Regression on the maximum temperature `horizon` days ahead.
    #[default]
    #[serde(rename = "reg_temp_max_nextday")]
    RegressionTempMax,
    /// Binary classification: does precipitation `horizon` days ahead exceed the rain
    /// threshold.
    #[serde(rename = "clf_rain10_nextday")]
    ClassifyRain,
}

impl Task {
    /// Short identifier, used in output file names.
    pub fn slug(&self) -> &'static str {
        match self {
            Task::RegressionTempMax => "reg_temp_max_nextday",
            Task::ClassifyRain => "clf_rain10_nextday",
        }
    }
}

/// Formats a `Task` using its slug.
///
/// # Examples
///
/// ```
/// use weather_features::Task;
///
/// assert_eq!(Task::ClassifyRain.to_string(), "clf_rain10_nextday");
/// ```
impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_serde_matches_slug() -> Result<(), serde_json::Error> {
        for task in [Task::RegressionTempMax, Task::ClassifyRain] {
            let json = serde_json::to_string(&task)?;
            assert_eq!(json, format!("\"{}\"", task.slug()));
            assert_eq!(serde_json::from_str::<Task>(&json)?, task);
        }
        Ok(())
    }
}
