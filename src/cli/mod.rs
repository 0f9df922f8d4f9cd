//! # Command Line Interface
//!
//! Runs single rotation steps by hand (or from a rotation event file) and
//! inspects the stage map of a secret.

pub mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::{RotatorConfig, StoreBackend, StoreConfig};
use crate::exchange::HttpCredentialExchange;
use crate::observability::{init_observability, log_config_info};
use crate::rotation::{RotationRequest, RotationStateMachine, RotationStep};
use crate::secrets::{InMemorySecretStore, SecretStore};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "oauth-rotator")]
#[command(about = "Rotates OAuth access/refresh token pairs held in a staged secret store")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one rotation step
    Handle {
        /// Rotation event JSON file, or '-' for stdin
        #[arg(long, value_name = "PATH|-", conflicts_with_all = ["secret_id", "token", "step"])]
        event: Option<PathBuf>,

        /// Secret to rotate
        #[arg(long, requires_all = ["token", "step"])]
        secret_id: Option<String>,

        /// Version id of the rotation attempt
        #[arg(long, requires = "secret_id")]
        token: Option<String>,

        /// createSecret, setSecret, testSecret or finishSecret
        #[arg(long, requires = "secret_id")]
        step: Option<String>,
    },

    /// Show the rotation flag and the version stages of a secret
    Describe {
        #[arg(long)]
        secret_id: String,

        /// Output format (json or table)
        #[arg(short, long, default_value = "table")]
        output: String,
    },
}

pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = RotatorConfig::from_env()?;
    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }
    if cli.json_logs {
        config.observability.json_logging = true;
    }
    init_observability(&config.observability)?;
    log_config_info(&config);

    let store = build_store(&config.store).await?;

    match cli.command {
        Commands::Handle { event, secret_id, token, step } => {
            let request = resolve_request(event.as_deref(), secret_id, token, step)?;
            let exchange = Arc::new(HttpCredentialExchange::new(&config.exchange)?);
            let machine = RotationStateMachine::new(store, exchange);

            if let Err(e) = machine.handle(&request).await {
                error!(
                    secret_id = %request.secret_id,
                    version_id = %request.client_request_token,
                    step = %request.step,
                    upstream_status = ?e.upstream().and_then(|u| u.status()),
                    error = %e,
                    "Rotation step failed"
                );
                return Err(e.into());
            }
            info!(
                secret_id = %request.secret_id,
                version_id = %request.client_request_token,
                step = %request.step,
                "Rotation step completed"
            );
        }

        Commands::Describe { secret_id, output } => {
            let format: OutputFormat = output.parse()?;
            let description = store.describe(&secret_id).await?;
            output::print_description(&description, format)?;
        }
    }

    Ok(())
}

/// Construct the configured secret store backend.
pub async fn build_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn SecretStore>> {
    match config.backend {
        StoreBackend::Memory => {
            let path = config
                .memory_snapshot
                .as_ref()
                .context("ROTATOR_MEMORY_SNAPSHOT is required for the memory store")?;
            let store = InMemorySecretStore::from_snapshot_file(path)
                .await
                .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
            Ok(Arc::new(store))
        }
        StoreBackend::Aws => build_aws_store(config).await,
    }
}

#[cfg(feature = "aws")]
async fn build_aws_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn SecretStore>> {
    let store = crate::secrets::AwsSecretsManagerStore::new(config.aws.clone()).await;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "aws"))]
async fn build_aws_store(_config: &StoreConfig) -> anyhow::Result<Arc<dyn SecretStore>> {
    anyhow::bail!(
        "AWS Secrets Manager support is not compiled in. Rebuild with --features aws \
         or set ROTATOR_STORE_BACKEND=memory"
    )
}

/// Build the rotation request from an event file or from explicit flags.
pub fn resolve_request(
    event: Option<&Path>,
    secret_id: Option<String>,
    token: Option<String>,
    step: Option<String>,
) -> anyhow::Result<RotationRequest> {
    if let Some(path) = event {
        let raw = if path == Path::new("-") {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("Failed to read event from stdin")?;
            buf
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read event file {}", path.display()))?
        };
        return serde_json::from_str(&raw).context("Invalid rotation event");
    }

    match (secret_id, token, step) {
        (Some(secret_id), Some(token), Some(step)) => {
            Ok(RotationRequest::new(secret_id, token, RotationStep::from_name(&step)))
        }
        _ => anyhow::bail!("Provide --event, or all of --secret-id, --token and --step"),
    }
}
