//! otpsync CLI - manage the one-time-password site registry from the terminal.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use otpsync_core::proxy::HttpProxy;
use otpsync_core::RegistryStore;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod error;


use crate::cli::{Cli, Commands, IconCommands};
use crate::commands::add::{run_add, AddRequest};
use crate::commands::common::{http_icon_resolver, open_store, resolve_state_path};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::export::run_export;
use crate::commands::icon::{run_icon_fetch, run_icon_set, IconSource};
use crate::commands::import::run_import;
use crate::commands::list::run_list;
use crate::commands::reorder::run_move;
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "otpsync=info,otpsync_core=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    let state_path = cli.state_path;

    match cli.command {
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref())?,
        Commands::Config { command } => {
            run_config(command, &resolve_state_path(state_path)?).await?;
        }
        Commands::List { sort, json } => {
            run_list(&mut store_at(state_path)?, sort.into(), json).await?;
        }
        Commands::Add {
            name,
            secret,
            urls,
            icon_file,
            no_auto_icon,
        } => {
            let request = AddRequest {
                name: &name,
                secret: &secret,
                urls: &urls,
                icon_file: icon_file.as_deref(),
                auto_icon: !no_auto_icon,
            };
            run_add(&mut store_at(state_path)?, &http_icon_resolver()?, request).await?;
        }
        Commands::Edit {
            name,
            secret,
            urls,
            icon_file,
        } => {
            run_edit(
                &mut store_at(state_path)?,
                &name,
                secret.as_deref(),
                &urls,
                icon_file.as_deref(),
            )
            .await?;
        }
        Commands::Delete { name, yes } => {
            run_delete(&mut store_at(state_path)?, &name, yes).await?;
        }
        Commands::Move { from, to } => run_move(&mut store_at(state_path)?, from, to).await?,
        Commands::Icon { command } => match command {
            IconCommands::Fetch { url } => run_icon_fetch(&http_icon_resolver()?, &url).await?,
            IconCommands::Set {
                name,
                file,
                auto,
                remove,
            } => {
                let source = IconSource::from_flags(file, auto, remove)?;
                run_icon_set(
                    &mut store_at(state_path)?,
                    &http_icon_resolver()?,
                    &name,
                    source,
                )
                .await?;
            }
        },
        Commands::Export { output } => {
            run_export(&mut store_at(state_path)?, output.as_deref()).await?;
        }
        Commands::Import { path, yes } => {
            run_import(&mut store_at(state_path)?, &path, yes).await?;
        }
    }

    Ok(())
}

fn store_at(state_path: Option<PathBuf>) -> Result<RegistryStore<HttpProxy>, CliError> {
    open_store(&resolve_state_path(state_path)?)
}
