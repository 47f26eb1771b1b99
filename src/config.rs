use std::path::PathBuf;

pub const LOG_FILE_NAME: &str = "logic_results.csv";

/// `~/Downloads/logic_results.csv`, or the bare file name when no home
/// directory can be resolved.
pub fn default_log_path() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join("Downloads").join(LOG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME))
}
