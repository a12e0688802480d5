//! Command-execution pipeline for a Microsoft 365 command line.
//!
//! Every command declares an option schema and a chain of validators. The
//! engine parses raw tokens against the schema, validates them, checks the
//! session, runs the command body against an [`HttpClient`](client::HttpClient),
//! normalizes any failure into a [`CommandError`](error::CommandError) and
//! hands results to a [`Renderer`](output::Renderer).
//!
//! # Modules
//!
//! - [`args`]: Token parsing and the typed, validated argument set.
//! - [`auth`]: OAuth2 client credentials token provider, one token per resource.
//! - [`client`]: The `HttpClient` seam and its reqwest implementation.
//! - [`command`]: The `Command` trait and per-invocation context.
//! - [`commands`]: Built-in commands (`aad user get|set`, `spo app list`).
//! - [`engine`]: Runs one invocation end to end.
//! - [`error`]: Transport errors, the normalized command error, and the normalizer.
//! - [`logging`]: `tracing` subscriber setup.
//! - [`options`]: Option descriptors, option sets, and global options.
//! - [`output`]: json, text and csv rendering.
//! - [`registry`]: Command lookup by verb path and help text.
//! - [`request`]: Request descriptors and URL encoding helpers.
//! - [`session`]: File configuration and the connection context.
//! - [`validation`]: Coercion, option-set checks, and the validator chain.
//!
//! # Quick Start
//!
//! ```ignore
//! use m365_cli::auth::TokenProvider;
//! use m365_cli::client::RestClient;
//! use m365_cli::command::CommandContext;
//! use m365_cli::commands::default_registry;
//! use m365_cli::engine::execute;
//! use m365_cli::output::ConsoleRenderer;
//! use m365_cli::session::Session;
//!
//! let registry = default_registry()?;
//! let session = Session::connected("https://graph.microsoft.com", None);
//! let http = RestClient::new(TokenProvider::new("tenant", "client_id", "secret"));
//! let ctx = CommandContext { session: &session, http: &http, renderer: &ConsoleRenderer };
//! let tokens = ["aad", "user", "get", "-n", "john@contoso.com"];
//! let (command, rest) = registry.resolve(&tokens).unwrap();
//! execute(command, &ctx, rest).await?;
//! ```

pub mod args;
pub mod auth;
pub mod client;
pub mod command;
pub mod commands;
pub mod engine;
pub mod error;
pub mod logging;
pub mod options;
pub mod output;
pub mod registry;
pub mod request;
pub mod session;
pub mod validation;
