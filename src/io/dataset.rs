//! Reading raw hourly CSV files and persisting finished datasets.

use crate::io::error::DatasetIoError;
use crate::types::daily_frame::DailyFrame;
use crate::types::hourly_frame::HourlyFrame;
use log::info;
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Where [`write_dataset`] put the two copies of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub csv: PathBuf,
    pub parquet: PathBuf,
}

/// Reads an hourly CSV export with a header row.
///
/// The file must have `time`, `temperature_2m` and `precipitation` columns; extra columns
/// are carried along and ignored by the pipeline. Timestamps are left as text and parsed
/// during resampling. The whole file is scanned for schema inference, so a temperature
/// column that only turns fractional late in the file is still read as numbers.
///
/// # Errors
///
/// [`DatasetIoError::CsvRead`] if the file cannot be read or parsed,
/// [`DatasetIoError::InvalidInput`] if a required column is missing.
pub fn read_hourly_csv(path: &Path) -> Result<HourlyFrame, DatasetIoError> {
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| DatasetIoError::CsvRead(path.to_path_buf(), e))?
        .finish()
        .map_err(|e| DatasetIoError::CsvRead(path.to_path_buf(), e))?;
    info!("Read {} hourly rows from {:?}", frame.height(), path);
    Ok(HourlyFrame::new(frame)?)
}

/// Writes `dataset` to `<out_dir>/<stem>.csv` and `<out_dir>/<stem>.parquet`, creating
/// `out_dir` if needed. Existing files are replaced.
pub fn write_dataset(
    dataset: &DailyFrame,
    out_dir: &Path,
    stem: &str,
) -> Result<DatasetPaths, DatasetIoError> {
    fs::create_dir_all(out_dir)
        .map_err(|e| DatasetIoError::DirCreation(out_dir.to_path_buf(), e))?;

    let paths = DatasetPaths {
        csv: out_dir.join(format!("{}.csv", stem)),
        parquet: out_dir.join(format!("{}.parquet", stem)),
    };
    let mut df = dataset.frame.clone();
    write_csv(&mut df, &paths.csv)?;
    write_parquet(&mut df, &paths.parquet)?;
    info!(
        "Saved {} rows x {} columns to {:?} and {:?}",
        df.height(),
        df.width(),
        paths.csv,
        paths.parquet
    );
    Ok(paths)
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), DatasetIoError> {
    let mut file = fs::File::create(path)
        .map_err(|e| DatasetIoError::FileCreate(path.to_path_buf(), e))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| DatasetIoError::CsvWrite(path.to_path_buf(), e))
}

fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), DatasetIoError> {
    let file = fs::File::create(path)
        .map_err(|e| DatasetIoError::FileCreate(path.to_path_buf(), e))?;
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Snappy)
        .finish(df)
        .map_err(|e| DatasetIoError::ParquetWrite(path.to_path_buf(), e))?;
    Ok(())
}
