//! Downloads recent hourly weather for a coordinate and writes a next-day dataset.
//!
//! ```sh
//! LAT=52.37 LON=4.90 TIMEZONE=Europe/Amsterdam cargo run --example build_dataset
//! ```

use std::env;
use std::path::Path;
use weather_features::{build_dataset, write_dataset, OpenMeteoClient, PipelineConfig, PipelineError};

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    let latitude = env_f64("LAT", 40.7128);
    let longitude = env_f64("LON", -74.0060);
    let config = PipelineConfig::builder()
        .timezone(env::var("TIMEZONE").unwrap_or_else(|_| "America/New_York".to_string()))
        .build();

    let hourly = OpenMeteoClient::new()
        .fetch_hourly()
        .latitude(latitude)
        .longitude(longitude)
        .past_days(60)
        .call()
        .await?;
    println!("Fetched {} hourly rows", hourly.height());

    let dataset = build_dataset(hourly, &config)?;
    println!("{}", dataset.frame);

    let paths = write_dataset(&dataset, Path::new("data/processed"), &config.dataset_stem())?;
    println!("Saved: {}", paths.csv.display());
    println!("Saved: {}", paths.parquet.display());
    Ok(())
}
