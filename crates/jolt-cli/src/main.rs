//! The jolt binary: parse arguments, run a build, report, exit.

use clap::Parser;

mod args;
mod driver;

fn main() {
    // Tracing output is opt-in via JOLT_LOG; diagnostics go through the
    // build log, not tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("JOLT_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli_args = args::CliArgs::parse();
    match driver::run(cli_args) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(1);
        }
    }
}
