//! CLI commands

pub mod agent;
pub mod config;
pub mod diff;
pub mod extract;
pub mod sessions;
pub mod sidecar;
pub mod tools;

use codemate_core::{CodemateError, CodemateResult};
use serde_json::Value;

/// Parse a JSON object given on the command line
pub(crate) fn parse_object(flag: &str, text: &str) -> CodemateResult<Value> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| CodemateError::invalid_input(format!("--{} is not valid JSON: {}", flag, e)))?;
    if !value.is_object() {
        return Err(CodemateError::invalid_input(format!(
            "--{} must be a JSON object",
            flag
        )));
    }
    Ok(value)
}
