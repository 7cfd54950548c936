pub mod config;
pub mod module;
pub mod plan;
pub mod run;

use anyhow::{Context, Result};
use krun_core::ModuleResponse;

/// Print the response as the single JSON object on stdout and return the exit code
pub(crate) fn emit(response: &ModuleResponse) -> Result<i32> {
    let json = serde_json::to_string(response).context("Failed to serialize module response")?;
    println!("{}", json);
    Ok(response.exit_code())
}
