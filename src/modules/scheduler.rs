// Nomad operator scheduler configuration reconciliation
//
// The scheduler configuration always exists, so this module never creates
// or deletes; it only overwrites when the live configuration does not
// already contain the desired one.

use std::str::FromStr;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::Module;
use crate::api::NomadApi;
use crate::client::ConnectionConfig;
use crate::output::errors::HashictlError;
use crate::reconcile::{is_subset, ModuleResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerAlgorithm {
    #[default]
    Binpack,
    Spread,
}

impl SchedulerAlgorithm {
    fn as_str(&self) -> &'static str {
        match self {
            SchedulerAlgorithm::Binpack => "binpack",
            SchedulerAlgorithm::Spread => "spread",
        }
    }
}

impl FromStr for SchedulerAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "binpack" => Ok(SchedulerAlgorithm::Binpack),
            "spread" => Ok(SchedulerAlgorithm::Spread),
            _ => Err(format!(
                "invalid scheduler algorithm '{}' (expected binpack or spread)",
                s
            )),
        }
    }
}

/// Which scheduler types may preempt lower-priority allocations
#[derive(Debug, Clone, Copy)]
pub struct PreemptionConfig {
    pub system_scheduler_enabled: bool,
    pub sys_batch_scheduler_enabled: bool,
    pub batch_scheduler_enabled: bool,
    pub service_scheduler_enabled: bool,
}

impl Default for PreemptionConfig {
    fn default() -> Self {
        PreemptionConfig {
            system_scheduler_enabled: true,
            sys_batch_scheduler_enabled: false,
            batch_scheduler_enabled: false,
            service_scheduler_enabled: false,
        }
    }
}

/// Desired operator scheduler configuration
#[derive(Debug, Clone, Default)]
pub struct SchedulerModule {
    pub scheduler_algorithm: SchedulerAlgorithm,
    pub memory_oversubscription_enabled: bool,
    pub reject_job_registration: bool,
    pub pause_eval_broker: bool,
    pub preemption: PreemptionConfig,
}

impl SchedulerModule {
    fn desired_body(&self) -> Value {
        json!({
            "SchedulerAlgorithm": self.scheduler_algorithm.as_str(),
            "MemoryOversubscriptionEnabled": self.memory_oversubscription_enabled,
            "RejectJobRegistration": self.reject_job_registration,
            "PauseEvalBroker": self.pause_eval_broker,
            "PreemptionConfig": {
                "SystemSchedulerEnabled": self.preemption.system_scheduler_enabled,
                "SysBatchSchedulerEnabled": self.preemption.sys_batch_scheduler_enabled,
                "BatchSchedulerEnabled": self.preemption.batch_scheduler_enabled,
                "ServiceSchedulerEnabled": self.preemption.service_scheduler_enabled,
            },
        })
    }
}

#[async_trait]
impl Module for SchedulerModule {
    fn name(&self) -> &'static str {
        "nomad_scheduler"
    }

    async fn run(&self, config: ConnectionConfig) -> Result<ModuleResult, HashictlError> {
        let nomad = NomadApi::new(config)?;

        let response = nomad.get_scheduler_config().await?;
        let existing = response
            .get("SchedulerConfig")
            .cloned()
            .unwrap_or(Value::Null);

        let desired = self.desired_body();

        let result = if is_subset(&desired, &existing) {
            debug!("scheduler configuration already satisfies desired state");
            ModuleResult::unchanged()
        } else {
            nomad.update_scheduler_config(&desired).await?;
            ModuleResult::changed()
        };

        Ok(result.with("scheduler_config", desired))
    }
}
