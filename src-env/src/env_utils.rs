//! Environment variable utilities for tuneq
//!
//! This module provides utilities for handling environment variables,
//! particularly the TUNEQ_DIR variable that points to the directory under
//! which processed curves are written.

use crate::constants::DATA_GENERATED;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Name of the environment variable holding the tuneq project root
pub const TUNEQ_DIR_VAR: &str = "TUNEQ_DIR";

/// Error type for environment variable issues
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error(
        "TUNEQ_DIR environment variable is not set. Please set it to the tuneq project root directory (e.g., export TUNEQ_DIR=/path/to/tuneq)"
    )]
    TuneqDirNotSet,

    #[error("TUNEQ_DIR points to a non-existent directory: {0}")]
    TuneqDirNotFound(PathBuf),

    #[error("Failed to create data_generated directory: {0}")]
    DataGeneratedCreationFailed(std::io::Error),
}

fn resolve_tuneq_dir(value: Option<OsString>) -> Result<PathBuf, EnvError> {
    let path = PathBuf::from(value.ok_or(EnvError::TuneqDirNotSet)?);
    if !path.exists() {
        return Err(EnvError::TuneqDirNotFound(path));
    }
    Ok(path)
}

/// Get the TUNEQ_DIR environment variable and validate it exists
///
/// # Errors
///
/// Returns an error if:
/// - TUNEQ_DIR is not set
/// - TUNEQ_DIR points to a non-existent directory
///
/// # Example
///
/// ```no_run
/// use tuneq_env::env_utils::get_tuneq_dir;
///
/// let tuneq_dir = get_tuneq_dir()?;
/// println!("tuneq directory: {}", tuneq_dir.display());
/// # Ok::<(), tuneq_env::env_utils::EnvError>(())
/// ```
pub fn get_tuneq_dir() -> Result<PathBuf, EnvError> {
    resolve_tuneq_dir(env::var_os(TUNEQ_DIR_VAR))
}

/// Path of the data_generated directory below `root`, created if missing.
pub fn data_generated_dir_in(root: &Path) -> Result<PathBuf, EnvError> {
    let data_generated = root.join(DATA_GENERATED);
    if !data_generated.exists() {
        std::fs::create_dir_all(&data_generated).map_err(EnvError::DataGeneratedCreationFailed)?;
    }
    Ok(data_generated)
}

/// Get the path to the data_generated directory, creating it if necessary
///
/// # Errors
///
/// Returns an error if TUNEQ_DIR is not set or invalid, or if the
/// directory cannot be created.
pub fn get_data_generated_dir() -> Result<PathBuf, EnvError> {
    let tuneq_dir = get_tuneq_dir()?;
    data_generated_dir_in(&tuneq_dir)
}

/// Check if TUNEQ_DIR is properly configured and print helpful information
///
/// ```no_run
/// use tuneq_env::env_utils::check_tuneq_env;
///
/// if let Err(e) = check_tuneq_env() {
///     eprintln!("Environment setup error: {}", e);
///     std::process::exit(1);
/// }
/// ```
pub fn check_tuneq_env() -> Result<(), EnvError> {
    let tuneq_dir = get_tuneq_dir()?;
    let data_generated = get_data_generated_dir()?;

    println!("✓ TUNEQ_DIR: {}", tuneq_dir.display());
    println!("✓ Data directory: {}", data_generated.display());

    Ok(())
}
