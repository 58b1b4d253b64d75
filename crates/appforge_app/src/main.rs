use std::process::ExitCode;

use clap::Parser;

mod cli;
mod platform;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match platform::run_app(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("appforge error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
