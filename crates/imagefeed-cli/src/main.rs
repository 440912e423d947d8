//! Image Feed CLI - browse the Unsplash photo feed from the terminal
//!
//! Hosts the core sign-in, feed and profile flows with the OS keychain as
//! token storage.

mod auth;
mod cli;
mod commands;
mod config;
mod error;
mod views;


use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::auth_cmd::run_auth;
use crate::commands::common::build_app;
use crate::commands::feed::run_feed;
use crate::commands::like::run_like;
use crate::commands::profile::run_profile;
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let app = build_app(cli.config.as_deref())?;
    let mut stdout = io::stdout();

    match cli.command {
        Commands::Auth { command } => run_auth(command, &app, &mut stdout).await,
        Commands::Feed { pages, json } => run_feed(&app, pages, json, &mut stdout).await,
        Commands::Like { id } => run_like(&app, &id, true, &mut stdout).await,
        Commands::Unlike { id } => run_like(&app, &id, false, &mut stdout).await,
        Commands::Profile => run_profile(&app, io::stdout()).await,
    }
}

fn init_tracing() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "imagefeed=info".parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
