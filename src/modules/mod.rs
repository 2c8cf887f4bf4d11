// Resource adapter modules
//
// Each module is a pure description of desired state for one remote
// resource; run() performs a single fetch-decide-act-report cycle against
// the service named by the connection config.

mod acl_policy;
mod acl_token;
mod intention;
mod job_parse;
mod scheduler;
mod service;

pub use acl_policy::{AclPolicyModule, JobAcl};
pub use acl_token::AclTokenModule;
pub use intention::IntentionModule;
pub use job_parse::JobParseModule;
pub use scheduler::{PreemptionConfig, SchedulerAlgorithm, SchedulerModule};
pub use service::ServiceModule;

use async_trait::async_trait;

use crate::client::ConnectionConfig;
use crate::output::errors::HashictlError;
use crate::reconcile::ModuleResult;

/// Trait for resource adapter implementations
#[async_trait]
pub trait Module: Send + Sync {
    /// Module name
    fn name(&self) -> &'static str;

    /// Run one reconciliation cycle against the remote service
    async fn run(&self, config: ConnectionConfig) -> Result<ModuleResult, HashictlError>;
}
