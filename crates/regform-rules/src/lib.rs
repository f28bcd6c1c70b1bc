//! Regform Rule Primitives
//!
//! Atomic, pure checks used by the regform validation engine. Every primitive
//! returns [`RuleResult`]: `Ok(())` when the value passes, `Err(message)` with a
//! human-readable message when it fails.

pub mod date;
pub mod email;
pub mod equality;
pub mod phone;
pub mod string;

// Re-export all primitives
pub use date::*;
pub use email::*;
pub use equality::*;
pub use phone::*;
pub use string::*;

/// Outcome of a single rule check. The message is present iff the check failed.
pub type RuleResult = Result<(), String>;
