//! Stable exit codes for the deploy CLI.

/// Every step succeeded (warnings allowed).
pub const OK: i32 = 0;
/// A fatal step aborted the run, or the configuration was invalid.
pub const FAILED: i32 = 1;
