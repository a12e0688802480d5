//! CLI entry point for m365: Microsoft 365 management from the command line.
//!
//! Connection settings come from flags, environment variables, or a TOML
//! file. Everything after them is the command path followed by that
//! command's own options, which the engine parses and validates.
//!
//! Exit codes:
//! - 0: success
//! - 1: command failure (validation, not connected, API error, etc.)
//! - 2: invalid connection flags (clap handles this automatically)

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use m365_cli::auth::TokenProvider;
use m365_cli::client::RestClient;
use m365_cli::command::CommandContext;
use m365_cli::commands::default_registry;
use m365_cli::engine::execute;
use m365_cli::error::ConfigError;
use m365_cli::logging;
use m365_cli::output::ConsoleRenderer;
use m365_cli::registry::{command_help, command_list};
use m365_cli::session::{Config, Session};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a TOML file with tenant_id, client_id, graph_url and spo_url.
    #[arg(long, env = "M365_CONFIG")]
    config: Option<PathBuf>,

    /// Azure AD tenant ID or domain.
    #[arg(long, env = "M365_TENANT_ID")]
    tenant_id: Option<String>,

    /// Azure AD application (client) ID.
    #[arg(long, env = "M365_CLIENT_ID")]
    client_id: Option<String>,

    /// Azure AD client secret. Prefer setting via the M365_CLIENT_SECRET
    /// environment variable to avoid exposing the secret in process listings
    /// and shell history.
    #[arg(long, env = "M365_CLIENT_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// SharePoint Online tenant root URL, e.g. https://contoso.sharepoint.com.
    #[arg(long, env = "M365_SPO_URL")]
    spo_url: Option<String>,

    /// Command path and its options, e.g. `spo app list --appCatalogScope tenant`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

impl Cli {
    /// File configuration with flag and environment values on top.
    fn config(&self) -> Result<Config, ConfigError> {
        let file = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        Ok(file.merge(Config {
            tenant_id: self.tenant_id.clone(),
            client_id: self.client_id.clone(),
            graph_url: None,
            spo_url: self.spo_url.clone(),
        }))
    }
}

fn is_help(token: &str) -> bool {
    token == "--help" || token == "-h"
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(logging::level_from_tokens(&cli.args));

    let registry = match default_registry() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.args.is_empty() {
        println!("Commands:\n{}", command_list(&registry));
        return ExitCode::SUCCESS;
    }

    let Some((command, rest)) = registry.resolve(&cli.args) else {
        let path = cli
            .args
            .iter()
            .take_while(|t| !t.starts_with('-'))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        eprintln!("Error: Command '{path}' was not found.");
        eprintln!("Commands:\n{}", command_list(&registry));
        return ExitCode::FAILURE;
    };

    if rest.iter().any(|t| is_help(t)) {
        println!("{}", command_help(command));
        return ExitCode::SUCCESS;
    }

    let config = match cli.config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let session = Session::from_config(&config, cli.secret.is_some());

    // A disconnected session never reaches the token endpoint, so empty
    // credentials are fine here.
    let auth = TokenProvider::new(
        config.tenant_id.as_deref().unwrap_or_default(),
        config.client_id.as_deref().unwrap_or_default(),
        cli.secret.as_deref().unwrap_or_default(),
    );
    let http = RestClient::new(auth);
    let renderer = ConsoleRenderer;
    let ctx = CommandContext {
        session: &session,
        http: &http,
        renderer: &renderer,
    };

    match execute(command, &ctx, rest).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
