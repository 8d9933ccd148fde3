//! Process exit codes.

/// The generated parser passed the verification suite.
pub const VERIFIED: u8 = 0;
/// Configuration, storage or other fatal error.
pub const FATAL: u8 = 1;
/// Every attempt failed verification.
pub const EXHAUSTED: u8 = 2;
