#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use command::run_command;
use log::LevelFilter;

mod cancel;
mod cli;
mod command;
mod config;
mod ctx;
mod divergence;
mod error;
mod graph;
mod merge_base;
mod print;
mod store;
mod tag_history;
mod walk;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    match run_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Failed with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
