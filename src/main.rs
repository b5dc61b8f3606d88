mod analyser;
mod annotate;
mod batch;
mod breakend_index;
mod breakend_pairs;
mod chaining;
mod chromosome_arms;
mod classify;
mod cli;
mod clustering;
mod clustering_config;
mod constants;
mod copy_number;
mod genome_regions;
mod globals;
mod int_range;
mod linked_pair;
mod log_utils;
mod logger;
mod os_utils;
mod run_stats;
mod sample_input;
mod sample_output;
mod sv_data;
mod union_find;
mod validation;

#[cfg(test)]
mod test_utils;

use std::{error, process};

use hhmmss::Hhmmss;
use log::info;

use crate::batch::run_cluster;
use crate::cli::Commands;
use crate::globals::{PROGRAM_NAME, PROGRAM_VERSION};
use crate::logger::setup_output_dir_and_logger;

fn run(settings: &cli::Settings) -> Result<(), Box<dyn error::Error>> {
    info!("Starting {PROGRAM_NAME} {PROGRAM_VERSION}");
    info!(
        "cmdline: {}",
        std::env::args().collect::<Vec<_>>().join(" ")
    );
    info!("Running on {} threads", settings.shared.thread_count);

    let start = std::time::Instant::now();

    match &settings.command {
        Commands::Cluster(x) => {
            run_cluster(&settings.shared, x);
        }
    }

    info!(
        "{PROGRAM_NAME} completed. Total Runtime: {}",
        start.elapsed().hhmmssxxx()
    );
    Ok(())
}

fn main() {
    let settings = cli::validate_and_fix_settings(cli::parse_settings());

    // Setup logger, including creation of the output directory for the log file:
    setup_output_dir_and_logger(
        settings.get_output_dir(),
        settings.shared.clobber,
        settings.shared.debug,
    );

    if let Err(err) = run(&settings) {
        eprintln!("{err}");
        process::exit(2);
    }
}
