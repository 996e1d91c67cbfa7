use chrono::{Datelike, Local};
use std::path::PathBuf;

/// Generate default dataset directory with format: output/dataset-{YYMMDD}
pub fn generate_default_dataset_dir() -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let dirname = format!("dataset-{:02}{:02}{:02}", year, month, day);
    PathBuf::from("output").join(dirname)
}
