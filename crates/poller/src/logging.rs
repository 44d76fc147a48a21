use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};

use herald_common::HeraldError;
use herald_common::config::LogRotation;

/// Rolling file writer for `path`, keeping at most `max_files` rolled files.
///
/// `logs/herald.log` with daily rotation writes `logs/herald.<date>.log`.
pub fn rolling_file(
    path: &str,
    rotation: LogRotation,
    max_files: usize,
) -> Result<RollingFileAppender, HeraldError> {
    let path = Path::new(path);
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let prefix = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| HeraldError::Config(format!("HERALD_LOG_FILE {path:?} has no file name")))?;

    let rotation = match rotation {
        LogRotation::Minutely => Rotation::MINUTELY,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    };

    let mut builder = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(prefix)
        .max_log_files(max_files);
    if let Some(suffix) = path.extension().and_then(|ext| ext.to_str()) {
        builder = builder.filename_suffix(suffix);
    }

    builder
        .build(directory)
        .map_err(|e| HeraldError::Config(format!("Cannot open log file {path:?}: {e}")))
}
