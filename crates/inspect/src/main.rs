// crates/inspect/src/main.rs

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use env_logger::Env;
use std::env;
use std::io::{self, Write};
use std::process;

use inspect::{run, InspectConfig, ProcessEnvironment};

fn main() {
    // Silent unless RUST_LOG asks for it; stderr belongs to the harness.
    env_logger::Builder::from_env(Env::default().default_filter_or("off")).init();

    match inspect_process() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            process::exit(1);
        }
    }
}

/// Parses the process arguments, runs the probe and returns the exit code.
fn inspect_process() -> Result<i32> {
    let config = InspectConfig::from_args(env::args_os()).unwrap_or_else(|err| usage_exit(err));
    log::debug!("{:?}", config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let outcome = run(&config, &ProcessEnvironment, &mut out);

    // Flush before any diagnostic so the two streams interleave in order.
    out.flush().context("Cannot flush standard output")?;

    match outcome {
        Ok(code) => Ok(code),
        Err(err) => {
            eprintln!("{}", err);
            Ok(err.exit_code())
        }
    }
}

/// Help goes to stderr and exits 0 so stdout only ever carries probe output.
/// Every other parse failure is a usage error with exit code 2.
fn usage_exit(err: clap::Error) -> ! {
    match err.kind() {
        ErrorKind::DisplayHelp => {
            eprint!("{}", err.render());
            process::exit(0);
        }
        _ => err.exit(),
    }
}
