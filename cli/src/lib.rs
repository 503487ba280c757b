//! stash-cli library
//!
//! Console front end for the stash upload/list client. Each subcommand
//! corresponds to one user action: sign in, sign out, upload one file,
//! list the uploaded files. The client itself lives in `stash-client`;
//! this crate only wires it to the terminal:
//! - deployment selection (local vs production) and persisted
//!   configuration,
//! - the HTTP identity session and vault transport,
//! - a console subscriber rendering status lines and listings.
//!
//! Every invocation starts with the same startup check the client
//! performs in a long-lived front end: a persisted session is resumed
//! when the provider still accepts it, so `upload` and `list` work
//! across processes without logging in again.

mod config;
mod console;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stash_client::UploadClient;
use stashx_identity::{HttpIdentitySession, SessionOptions};
use stashx_vault::HttpVaultBinder;
use url::Url;

pub use config::{
    deployment_from, deployment_from_env, identity_port_from_env,
    identity_provider_url, service_url, CliConfig, DEFAULT_IDENTITY_PORT,
    DEFAULT_LOCAL_SERVICE_URL, DEFAULT_PRODUCTION_SERVICE_URL,
    PRODUCTION_IDENTITY_URL,
};
pub use console::ConsoleSubscriber;

#[derive(Parser, Debug)]
#[clap(name = "stash-cli")]
#[clap(about = "Upload files to your stash and list them", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with the identity provider
    Login,

    /// Revoke the current session
    Logout,

    /// Upload one file
    Upload { path: PathBuf },

    /// List your uploaded files
    List,

    /// Show or change the persisted configuration
    Config {
        /// Set the remote service address
        #[clap(long)]
        service_url: Option<Url>,
    },
}

/// Entry point used by the binary.
pub async fn run_cli() -> Result<()> {
    let args = Cli::parse();
    let mut config = CliConfig::load()?;

    if let Command::Config { service_url } = &args.command {
        return handle_config(&mut config, service_url.clone());
    }

    let deployment = deployment_from_env();
    let provider =
        identity_provider_url(deployment, &config, identity_port_from_env())?;
    let service = service_url(deployment, &config)?;

    let session = HttpIdentitySession::create(SessionOptions {
        storage_dir: None,
        disable_idle_timeout: true,
    })?;
    let binder = HttpVaultBinder::new(service);

    let mut client = UploadClient::new(session, binder, provider, deployment);
    client.subscribe(Arc::new(ConsoleSubscriber::new()));
    client.initialize().await;

    let outcome = match args.command {
        Command::Login => {
            if client.is_authenticated() {
                println!("Already logged in.");
                Ok(())
            } else {
                client.login().await
            }
        }
        Command::Logout => client.logout().await,
        Command::Upload { path } => {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .unwrap_or_default();
            let bytes = std::fs::read(&path).with_context(|| {
                format!("Could not read file: {}", path.display())
            })?;
            client.upload_one(&name, &bytes).await
        }
        Command::List => client.refresh_list().await,
        Command::Config { .. } => unreachable!("handled above"),
    };

    // The failure was already surfaced as a status line; only the exit
    // code is left to report.
    if outcome.is_err() {
        std::process::exit(1);
    }
    Ok(())
}

fn handle_config(
    config: &mut CliConfig,
    service_url: Option<Url>,
) -> Result<()> {
    if let Some(url) = service_url {
        config.set_service_url(url.clone())?;
        println!("Service address set to {}", url);
        return Ok(());
    }

    let deployment = deployment_from_env();
    println!("Deployment: {:?}", deployment);
    println!(
        "Identity provider: {}",
        identity_provider_url(deployment, config, identity_port_from_env())?
    );
    println!("Service address: {}", config::service_url(deployment, config)?);
    Ok(())
}
