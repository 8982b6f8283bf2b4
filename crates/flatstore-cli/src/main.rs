use std::io;
use std::process;

use clap::Parser;
use flatstore_cli::cli::Cli;
use flatstore_cli::{config, exit_code, logging, run};

fn main() {
    let cli = Cli::parse();

    let settings = match config::resolve(&cli, |key| std::env::var(key).ok()) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(exit_code(&err));
        }
    };
    logging::init_tracing(&settings);

    let stdout = io::stdout();
    if let Err(err) = run(cli, &settings, &mut stdout.lock()) {
        tracing::error!(error = %err, "command failed");
        eprintln!("error: {err}");
        process::exit(exit_code(&err));
    }
}
