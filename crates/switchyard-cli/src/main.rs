//! Switchyard CLI - blue-green publishing for serverless functions
//!
//! `switchyard publish <archive>...` rolls one or more packaged archives
//! out to the remote function platform: create or update, publish an
//! immutable version, verify it by invocation, then switch the traffic
//! alias. The process exits non-zero on any publish failure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use switchyard_platform::{FunctionPlatform, IdentityPlatform, RestPlatform};
use switchyard_publish::{PublishOptions, PublishOrchestrator, ResponseCheck};
use switchyard_types::DeployableArtifact;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod error;

use error::{CliError, CliResult};

/// Switchyard CLI application
#[derive(Parser)]
#[command(name = "switchyard")]
#[command(about = "Switchyard - zero-downtime function publishing", long_about = None)]
#[command(version)]
struct Cli {
    /// Control-plane endpoint
    #[arg(
        short,
        long,
        env = "SWITCHYARD_ENDPOINT",
        default_value = "http://localhost:9000"
    )]
    endpoint: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Publish packaged archives and switch the traffic alias
    Publish {
        /// Archive locations (`<name>.zip`, one function each)
        #[arg(required = true)]
        archives: Vec<PathBuf>,

        /// Execution role for newly created functions (skips provisioning)
        #[arg(short, long)]
        role: Option<String>,

        /// Traffic alias to switch after verification
        #[arg(short, long, default_value = "development")]
        alias: String,

        /// Verification payload: inline JSON or a `file://` reference
        #[arg(short, long)]
        payload: Option<String>,

        /// Require the verification response to contain this substring
        #[arg(long)]
        expect: Option<String>,
    },
}

/// Resolve an inline payload or a `file://` reference into bytes
fn resolve_payload(payload: Option<&str>) -> CliResult<Vec<u8>> {
    match payload {
        None => Ok(Vec::new()),
        Some(value) => match value.strip_prefix("file://") {
            Some(path) => std::fs::read(path).map_err(|source| CliError::PayloadFile {
                path: path.to_string(),
                source,
            }),
            None => Ok(value.as_bytes().to_vec()),
        },
    }
}

fn response_check(expect: Option<String>) -> ResponseCheck {
    match expect {
        Some(needle) => {
            Arc::new(move |payload: &[u8]| String::from_utf8_lossy(payload).contains(&needle))
        }
        None => Arc::new(|_: &[u8]| true),
    }
}

async fn publish(
    endpoint: &str,
    archives: Vec<PathBuf>,
    role: Option<String>,
    alias: String,
    payload: Option<String>,
    expect: Option<String>,
) -> CliResult<()> {
    let rest = Arc::new(RestPlatform::new(endpoint)?);
    let functions: Arc<dyn FunctionPlatform> = rest.clone();
    let identity: Arc<dyn IdentityPlatform> = rest;

    let options = PublishOptions {
        alias_name: alias,
        role_override: role,
        payload: resolve_payload(payload.as_deref())?,
        ..PublishOptions::default()
    };
    let orchestrator = PublishOrchestrator::new(functions, identity, options);

    let artifacts = archives
        .into_iter()
        .map(DeployableArtifact::from_location)
        .collect::<Result<Vec<_>, _>>()?;

    let pointers = orchestrator
        .publish_all(&artifacts, response_check(expect))
        .await?;

    for pointer in pointers {
        println!(
            "✓ {} alias {} -> version {}",
            pointer.function_name, pointer.alias_name, pointer.target_version
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let result = match cli.command {
        Commands::Publish {
            archives,
            role,
            alias,
            payload,
            expect,
        } => publish(&cli.endpoint, archives, role, alias, payload, expect).await,
    };

    if let Err(err) = result {
        eprintln!("✗ publish failed: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_payload_passes_through() {
        let payload = resolve_payload(Some(r#"{"ping":true}"#)).unwrap();
        assert_eq!(payload, br#"{"ping":true}"#);
    }

    #[test]
    fn absent_payload_is_empty() {
        assert!(resolve_payload(None).unwrap().is_empty());
    }

    #[test]
    fn missing_payload_file_is_reported() {
        let err = resolve_payload(Some("file:///nonexistent/payload.json")).unwrap_err();
        assert!(matches!(err, CliError::PayloadFile { .. }));
    }

    #[test]
    fn expect_substring_drives_the_check() {
        let check = response_check(Some("\"ok\"".to_string()));
        assert!(check(br#"{"status":"ok"}"#));
        assert!(!check(br#"{"status":"error"}"#));
    }
}
