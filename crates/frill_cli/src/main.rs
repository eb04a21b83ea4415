//! The `frill` binary.

use std::process;
use std::sync::Arc;

use clap::Parser;
use frill_build::ShadercCompiler;
use frill_cli::{init_logging, run, Cli};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    match run(&cli, Arc::new(ShadercCompiler::new())) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
