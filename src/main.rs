mod cli;
mod log;

use std::env;
use std::process::ExitCode;

use ::log::LevelFilter;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    // Initialize logger
    log::init(LevelFilter::Warn);

    match cli::run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
