// hashictl - HashiCorp resource reconciliation and 1Password Connect lookups
//
// Thin adapters over the Consul, Nomad and 1Password Connect HTTP APIs.
// Each module performs one idempotent reconciliation of desired state
// against the state fetched from the remote service.

pub mod api;
pub mod client;
pub mod config;
pub mod modules;
pub mod output;
pub mod plugins;
pub mod reconcile;

pub use client::{ConnectionConfig, HttpClient};
pub use modules::Module;
pub use output::HashictlError;
pub use reconcile::{is_subset, prune_nulls, ModuleResult, ResourceState};

/// Version of the hashictl tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::client::{ConnectionConfig, HttpClient};
    pub use crate::modules::Module;
    pub use crate::output::HashictlError;
    pub use crate::reconcile::{is_subset, prune_nulls, ModuleResult, ResourceState};
}
