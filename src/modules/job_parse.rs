// Nomad job-spec parse (pure fetch-and-translate)

use async_trait::async_trait;
use serde_json::json;

use super::Module;
use crate::api::NomadApi;
use crate::client::ConnectionConfig;
use crate::output::errors::HashictlError;
use crate::reconcile::{prune_nulls, ModuleResult};

/// Ask the Nomad server to translate an HCL job spec into its JSON form
#[derive(Debug, Clone)]
pub struct JobParseModule {
    pub namespace: String,
    pub hcl_spec: String,
}

impl JobParseModule {
    pub fn new(hcl_spec: impl Into<String>) -> Self {
        JobParseModule {
            namespace: "default".to_string(),
            hcl_spec: hcl_spec.into(),
        }
    }
}

#[async_trait]
impl Module for JobParseModule {
    fn name(&self) -> &'static str {
        "nomad_job_parse"
    }

    async fn run(&self, config: ConnectionConfig) -> Result<ModuleResult, HashictlError> {
        let nomad = NomadApi::new(config)?;

        let body = prune_nulls(json!({
            "namespace": self.namespace,
            "JobHCL": self.hcl_spec,
        }));

        let parsed = nomad.parse_job(&body).await?;

        Ok(ModuleResult::unchanged().with("parsed", parsed))
    }
}
