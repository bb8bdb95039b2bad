//! Constants shared across the workspace

/// Directory (relative to `TUNEQ_DIR`) where generated curves are written
pub const DATA_GENERATED: &str = "data_generated";

/// Minimum number of parseable data points a dataset must contain
pub const MIN_VALID_POINTS: usize = 10;

/// A frequency below this fraction of the previous one is reported as out of order
pub const ORDER_TOLERANCE: f64 = 0.9;

/// Number of decimals used when formatting processed SPL values
pub const SPL_DECIMALS: usize = 2;

/// Header label of the frequency column
pub const DEFAULT_FREQ_LABEL: &str = "Freq(Hz)";

/// Header label of the SPL column
pub const DEFAULT_SPL_LABEL: &str = "SPL(dB)";
