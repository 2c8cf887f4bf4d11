// Layered configuration resolution
//
// Every connection parameter resolves through the same ordered chain:
// explicit value -> named environment variable -> hard failure. There is no
// ambient global lookup; callers name the variable they fall back to.

use crate::output::errors::HashictlError;

// Consul
pub const CONSUL_HTTP_ADDR: &str = "CONSUL_HTTP_ADDR";
pub const CONSUL_HTTP_TOKEN: &str = "CONSUL_HTTP_TOKEN";

// Nomad
pub const NOMAD_ADDR: &str = "NOMAD_ADDR";
pub const NOMAD_TOKEN: &str = "NOMAD_TOKEN";

// 1Password Connect
pub const OP_CONNECT_HOST: &str = "OP_CONNECT_HOST";
pub const OP_CONNECT_TOKEN: &str = "OP_CONNECT_TOKEN";
pub const OP_VAULT_ID: &str = "OP_VAULT_ID";

/// Resolve a required parameter: explicit value, then environment variable,
/// then a Config error naming both
pub fn resolve(
    name: &str,
    explicit: Option<String>,
    env_var: &str,
) -> Result<String, HashictlError> {
    resolve_opt(explicit, env_var).ok_or_else(|| {
        HashictlError::Config(format!(
            "{} not set and environment variable {} is unset",
            name, env_var
        ))
    })
}

/// Resolve an optional parameter: explicit value, then environment variable
pub fn resolve_opt(explicit: Option<String>, env_var: &str) -> Option<String> {
    explicit
        .filter(|s| !s.is_empty())
        .or_else(|| std::env::var(env_var).ok().filter(|s| !s.is_empty()))
}
