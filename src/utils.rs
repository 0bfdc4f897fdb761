use chrono::NaiveDate;
use std::io;
use std::path::{Path, PathBuf};

const DATA_DIR_NAME: &str = "citycast";

/// Default location of the source tables when no data directory is configured.
pub fn get_data_dir() -> io::Result<PathBuf> {
    dirs::data_dir()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "Could not determine system data directory",
            )
        })
        .map(|p| p.join(DATA_DIR_NAME))
}

/// Creates `path` (and its parents) when it does not exist yet.
pub fn ensure_dir_exists(path: &Path) -> io::Result<()> {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Path exists but is not a directory: {}", path.display()),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("Creating directory: {}", path.display());
            std::fs::create_dir_all(path)
        }
        Err(e) => Err(e),
    }
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Physical representation of a polars `Date`.
pub(crate) fn days_since_epoch(date: NaiveDate) -> i32 {
    (date - epoch()).num_days() as i32
}

pub(crate) fn date_from_days(days: i32) -> NaiveDate {
    epoch() + chrono::Duration::days(days as i64)
}
