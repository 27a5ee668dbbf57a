use std::io;

use clap::Parser;
use gradebot::{config::Cli, logging, pause_for_input, run};
use tracing::error;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.debug, cli.total);

    if let Err(e) = run(&cli) {
        error!(err = %format!("{e:#}"), "error running gradebot");
    }

    if !cli.no_pause {
        pause_for_input(&mut io::stdout(), io::stdin().lock());
    }
}
