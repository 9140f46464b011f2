//! Exit codes of the `payload` binary.

pub const SUCCESS: i32 = 0;
pub const PARTIAL: i32 = 1; // Output written, but some entries or files were skipped
pub const FATAL: i32 = 2; // Nothing written: config, input, or archive build error
