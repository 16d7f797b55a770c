mod cli;
mod commands;
mod config;
mod docx;
mod error;
mod install;
mod magick;
mod mcp;
mod page_range;
mod paths;
mod pdf;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ConfigAction};
use config::{Config, ConfigStore};
use magick::BackgroundOptions;
use pdf::stamp::ImagePlacement;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // stdout belongs to command output and the MCP transport.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    let store = ConfigStore::user_default();
    let config: Config = store.load();

    let report = match command {
        Commands::Mcp => return mcp::run_server(config).await,
        Commands::Merge { inputs, out } => {
            commands::merge::run(&inputs, out.output.as_deref(), out.yes, &config)?
        }
        Commands::ToWord { path, out } => {
            commands::to_word::run(&path, out.output.as_deref(), out.yes, &config)?
        }
        Commands::Sign {
            pdf,
            signature,
            x,
            y,
            width,
            height,
            opacity,
            pages,
            no_remove_bg,
            fuzz,
            feather,
            output,
            yes,
            help: _,
        } => {
            let options = commands::sign::SignOptions {
                placement: ImagePlacement {
                    x,
                    y,
                    width,
                    height,
                    opacity,
                },
                pages,
                background: (!no_remove_bg).then(|| BackgroundOptions {
                    fuzz,
                    feather,
                    ..Default::default()
                }),
            };
            commands::sign::run(&pdf, &signature, &options, output.as_deref(), yes, &config)
                .await?
        }
        Commands::InsertDate {
            path,
            x,
            y,
            size,
            format,
            pages,
            output,
            yes,
        } => {
            let options = commands::insert_date::DateOptions {
                x,
                y,
                size,
                format,
                pages,
            };
            commands::insert_date::run(&path, &options, output.as_deref(), yes, &config)?
        }
        Commands::RemovePages { path, pages, out } => commands::pages::remove(
            &path,
            pages.as_deref(),
            out.output.as_deref(),
            out.yes,
            &config,
        )?,
        Commands::ReorderPages { path, order, out } => commands::pages::reorder(
            &path,
            order.as_deref(),
            out.output.as_deref(),
            out.yes,
            &config,
        )?,
        Commands::RemoveBg {
            path,
            color,
            fuzz,
            feather,
            out,
        } => {
            let options = BackgroundOptions {
                color,
                fuzz,
                feather,
                ..Default::default()
            };
            commands::image::remove_background(
                &path,
                &options,
                out.output.as_deref(),
                out.yes,
                &config,
            )
            .await?
        }
        Commands::Filter { path, name, out } => {
            commands::image::apply_filter(&path, &name, out.output.as_deref(), out.yes, &config)
                .await?
        }
        Commands::Config { action } => {
            let message = match action {
                None => commands::config::show(&store, &config)?,
                Some(ConfigAction::Reset) => commands::config::reset(&store)?,
            };
            println!("{}", message);
            return Ok(());
        }
        Commands::Install { dir } => {
            println!("{}", commands::install::install(dir.as_deref())?);
            return Ok(());
        }
        Commands::Uninstall { dir } => {
            println!("{}", commands::install::uninstall(dir.as_deref())?);
            return Ok(());
        }
    };

    println!("{}", report.message);
    Ok(())
}
