use clap::Parser;
use modsync_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();

    if cli.log_file {
        if let Err(e) = logging::init_file_logging(cli.verbose) {
            logging::init_logging(cli.verbose);
            tracing::warn!("log file unavailable ({:#}), logging to stderr", e);
        }
    } else {
        logging::init_logging(cli.verbose);
    }

    if let Err(err) = cli.run() {
        eprintln!("modsync error: {:#}", err);
        std::process::exit(1);
    }
}
