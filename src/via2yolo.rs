use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use via2yolo::{run, Args};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Some(via) = &args.via {
        if !via.exists() {
            error!("The specified VIA dataset does not exist: {}", via.display());
            return ExitCode::FAILURE;
        }
        info!("Starting the conversion process...");
    }

    match run(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Failed to convert dataset: {}", e);
            ExitCode::FAILURE
        }
    }
}
