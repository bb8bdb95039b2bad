//! tuneq environment and constants
//!
//! Shared environment variable handling and the policy constants used by
//! several workspace members.

pub mod constants;
pub mod env_utils;

// Re-export commonly used items
pub use constants::{
    DATA_GENERATED, DEFAULT_FREQ_LABEL, DEFAULT_SPL_LABEL, MIN_VALID_POINTS, ORDER_TOLERANCE,
    SPL_DECIMALS,
};
pub use env_utils::{EnvError, check_tuneq_env, get_data_generated_dir, get_tuneq_dir};
