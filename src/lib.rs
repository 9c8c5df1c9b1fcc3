pub mod alias;
pub mod align;
pub mod append;
pub mod clean;
pub mod cli;
pub mod columns;
pub mod config;
pub mod engine;
pub mod error;
pub mod explore;
pub mod frame;
pub mod geo;
pub mod io_utils;
pub mod pipeline;
pub mod region;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands};

pub use crate::{
    config::{GoldOptions, ReconcileConfig},
    engine::{GoldOutput, GoldReport, SilverToGold},
    error::ReconcileError,
    frame::Frame,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging(verbose: bool) {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            let level = if verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            };
            builder.filter_module("world_happiness", level);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Clean(args) => {
            pipeline::clean_layer(&args.bronze, &args.silver, &args.input)?;
            Ok(())
        }
        Commands::Gold(args) => {
            pipeline::gold_layer(
                &args.silver,
                &args.gold,
                &args.reconcile,
                &args.input,
                cli.verbose,
            )?;
            Ok(())
        }
        Commands::Pipeline(args) => {
            pipeline::clean_layer(&args.bronze, &args.silver, &args.input)?;
            pipeline::gold_layer(
                &args.silver,
                &args.gold,
                &args.reconcile,
                &args.input,
                cli.verbose,
            )?;
            Ok(())
        }
        Commands::Preview(args) => table::preview(
            &args.input,
            args.rows,
            args.format.delimiter,
            args.format.input_encoding.as_deref(),
        ),
        Commands::Explore(args) => explore::execute(
            &args.input,
            &args.exclude,
            args.top,
            args.format.delimiter,
            args.format.input_encoding.as_deref(),
        ),
        Commands::Columns(args) => {
            let config = pipeline::load_config(args.config.as_deref())?;
            columns::execute(
                &args.input,
                args.format.delimiter,
                args.format.input_encoding.as_deref(),
                &config,
            )
        }
        Commands::Config(args) => {
            ReconcileConfig::default()
                .save(&args.output)
                .with_context(|| format!("Writing config to {:?}", args.output))?;
            info!("Default reconciliation tables written to {:?}", args.output);
            Ok(())
        }
    }
}
