// Output module for hashictl

pub mod errors;

pub use errors::{render_error, suggest_fix, HashictlError};

use crate::reconcile::ModuleResult;

/// Print a module result as pretty JSON on stdout
pub fn print_result(result: &ModuleResult) {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("failed to serialize result: {}", e),
    }
}
