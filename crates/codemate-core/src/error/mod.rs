//! Error types for CodeMate
//!
//! Every error exposes a stable `error_code()` for programmatic handling and a
//! `user_message()` suitable for a notice at the UI boundary.
//!
//! Bounded-input conditions (a diff that is too large) are not errors; they
//! degrade to `None` at the call site.

mod constructors;
mod conversions;
mod types;

pub use types::{CodemateError, CodemateResult, OptionExt};
