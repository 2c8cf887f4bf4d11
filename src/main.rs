// hashictl CLI - reconcile Consul and Nomad resources, fetch 1Password
// Connect secrets

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use hashictl::client::ConnectionConfig;
use hashictl::config;
use hashictl::modules::{
    AclPolicyModule, AclTokenModule, IntentionModule, JobAcl, JobParseModule, Module,
    PreemptionConfig, SchedulerAlgorithm, SchedulerModule, ServiceModule,
};
use hashictl::output::{self, HashictlError};
use hashictl::plugins::onepassword_connect;
use hashictl::reconcile::ResourceState;

#[derive(Parser)]
#[command(
    name = "hashictl",
    about = "Reconcile Consul and Nomad resources and fetch 1Password Connect secrets",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Endpoint URL (falls back to the service's address environment variable)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Management token (falls back to the service's token environment variable)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Connection timeout in seconds
    #[arg(long, global = true, default_value = "10")]
    timeout: u64,

    /// Disable TLS certificate verification (insecure)
    #[arg(long, global = true)]
    insecure: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Consul resources
    Consul {
        #[command(subcommand)]
        command: ConsulCommands,
    },

    /// Nomad resources
    Nomad {
        #[command(subcommand)]
        command: NomadCommands,
    },

    /// Fetch a field value from a 1Password Connect item
    Secret {
        /// Item title (case-exact match)
        item_title: String,

        /// Field label within the item
        field_label: String,

        /// Vault id (falls back to OP_VAULT_ID, then the first vault listed)
        #[arg(long)]
        vault: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConsulCommands {
    /// Read an ACL token
    AclToken {
        /// Accessor id of the token; reads the authenticating token when omitted
        #[arg(long)]
        accessor_id: Option<String>,
    },

    /// List the catalog instances of a service
    Service {
        /// Service name
        name: String,
    },

    /// Reconcile a connect intention
    Intention {
        /// Source service of the intention
        #[arg(long)]
        source: String,

        /// Destination service of the intention
        #[arg(long)]
        destination: String,

        /// Desired presence of the intention
        #[arg(long, default_value = "present")]
        state: ResourceState,

        #[arg(long)]
        description: Option<String>,

        /// Intention action (allow or deny)
        #[arg(long)]
        action: Option<String>,

        /// L7 permissions as a JSON array
        #[arg(long)]
        permissions: Option<String>,
    },
}

#[derive(Subcommand)]
enum NomadCommands {
    /// Reconcile an ACL policy
    AclPolicy {
        /// Policy name
        name: String,

        /// Desired presence of the policy
        #[arg(long, default_value = "present")]
        state: ResourceState,

        #[arg(long)]
        description: Option<String>,

        /// Policy rules in HCL
        #[arg(long, conflicts_with = "rules_file")]
        rules: Option<String>,

        /// Read policy rules from a file
        #[arg(long)]
        rules_file: Option<PathBuf>,

        /// Scope the policy to a namespace (workload identity)
        #[arg(long)]
        job_acl_namespace: Option<String>,

        /// Scope the policy to a job id
        #[arg(long)]
        job_acl_job_id: Option<String>,

        /// Scope the policy to a task group
        #[arg(long)]
        job_acl_group: Option<String>,

        /// Scope the policy to a task
        #[arg(long)]
        job_acl_task: Option<String>,
    },

    /// Reconcile the operator scheduler configuration
    Scheduler {
        /// Scheduler algorithm (binpack or spread)
        #[arg(long, default_value = "binpack")]
        scheduler_algorithm: SchedulerAlgorithm,

        #[arg(long)]
        memory_oversubscription: bool,

        #[arg(long)]
        reject_job_registration: bool,

        #[arg(long)]
        pause_eval_broker: bool,

        /// Disallow preemption by the system scheduler (allowed by default)
        #[arg(long)]
        no_preemption_system: bool,

        #[arg(long)]
        preemption_sysbatch: bool,

        #[arg(long)]
        preemption_batch: bool,

        #[arg(long)]
        preemption_service: bool,
    },

    /// Parse an HCL job spec into its JSON form
    JobParse {
        /// Path to the HCL job spec
        hcl_file: PathBuf,

        #[arg(long, default_value = "default")]
        namespace: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("hashictl=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{}", output::render_error(&e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), HashictlError> {
    let timeout = Duration::from_secs(cli.timeout);

    match cli.command {
        Commands::Consul { command } => {
            let config = connection(
                cli.url,
                cli.token,
                config::CONSUL_HTTP_ADDR,
                config::CONSUL_HTTP_TOKEN,
                timeout,
                cli.insecure,
            )?;

            let result = match command {
                ConsulCommands::AclToken { accessor_id } => {
                    AclTokenModule { accessor_id }.run(config).await?
                }

                ConsulCommands::Service { name } => {
                    ServiceModule { service_name: name }.run(config).await?
                }

                ConsulCommands::Intention {
                    source,
                    destination,
                    state,
                    description,
                    action,
                    permissions,
                } => {
                    let permissions = permissions.map(parse_permissions).transpose()?;
                    IntentionModule {
                        source,
                        destination,
                        state,
                        description,
                        action,
                        permissions,
                    }
                    .run(config)
                    .await?
                }
            };

            output::print_result(&result);
        }

        Commands::Nomad { command } => {
            let config = connection(
                cli.url,
                cli.token,
                config::NOMAD_ADDR,
                config::NOMAD_TOKEN,
                timeout,
                cli.insecure,
            )?;

            let result = match command {
                NomadCommands::AclPolicy {
                    name,
                    state,
                    description,
                    rules,
                    rules_file,
                    job_acl_namespace,
                    job_acl_job_id,
                    job_acl_group,
                    job_acl_task,
                } => {
                    let rules = match (rules, rules_file) {
                        (Some(inline), _) => Some(inline),
                        (None, Some(path)) => Some(read_file(&path)?),
                        (None, None) => None,
                    };

                    AclPolicyModule {
                        name,
                        state,
                        description,
                        rules,
                        job_acl: JobAcl {
                            namespace: job_acl_namespace,
                            job_id: job_acl_job_id,
                            group: job_acl_group,
                            task: job_acl_task,
                        },
                    }
                    .run(config)
                    .await?
                }

                NomadCommands::Scheduler {
                    scheduler_algorithm,
                    memory_oversubscription,
                    reject_job_registration,
                    pause_eval_broker,
                    no_preemption_system,
                    preemption_sysbatch,
                    preemption_batch,
                    preemption_service,
                } => {
                    SchedulerModule {
                        scheduler_algorithm,
                        memory_oversubscription_enabled: memory_oversubscription,
                        reject_job_registration,
                        pause_eval_broker,
                        preemption: PreemptionConfig {
                            system_scheduler_enabled: !no_preemption_system,
                            sys_batch_scheduler_enabled: preemption_sysbatch,
                            batch_scheduler_enabled: preemption_batch,
                            service_scheduler_enabled: preemption_service,
                        },
                    }
                    .run(config)
                    .await?
                }

                NomadCommands::JobParse {
                    hcl_file,
                    namespace,
                } => {
                    let hcl_spec = read_file(&hcl_file)?;
                    JobParseModule {
                        namespace,
                        hcl_spec,
                    }
                    .run(config)
                    .await?
                }
            };

            output::print_result(&result);
        }

        Commands::Secret {
            item_title,
            field_label,
            vault,
        } => {
            let config = connection(
                cli.url,
                cli.token,
                config::OP_CONNECT_HOST,
                config::OP_CONNECT_TOKEN,
                timeout,
                cli.insecure,
            )?;

            let value = onepassword_connect(config, &item_title, &field_label, vault).await?;

            // raw value only, fit for command substitution
            println!("{}", value);
        }
    }

    Ok(())
}

/// Build a connection config through the resolution chain: explicit flag,
/// then the service's environment variable, then a hard failure
fn connection(
    url: Option<String>,
    token: Option<String>,
    addr_env: &str,
    token_env: &str,
    timeout: Duration,
    insecure: bool,
) -> Result<ConnectionConfig, HashictlError> {
    let base_url = config::resolve("url", url, addr_env)?;
    let token = config::resolve("token", token, token_env)?;

    Ok(ConnectionConfig::new(base_url)
        .with_token(token)
        .with_timeout(timeout)
        .with_validate_certs(!insecure))
}

fn parse_permissions(raw: String) -> Result<Vec<Value>, HashictlError> {
    match serde_json::from_str(&raw) {
        Ok(Value::Array(permissions)) => Ok(permissions),
        Ok(_) => Err(HashictlError::Config(
            "--permissions must be a JSON array".to_string(),
        )),
        Err(e) => Err(HashictlError::Config(format!(
            "--permissions is not valid JSON: {}",
            e
        ))),
    }
}

fn read_file(path: &PathBuf) -> Result<String, HashictlError> {
    std::fs::read_to_string(path)
        .map_err(|e| HashictlError::Config(format!("failed to read {}: {}", path.display(), e)))
}
