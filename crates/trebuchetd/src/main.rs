//! `trebuchetd` entry point.

use std::process::ExitCode;

use clap::Parser;

use trebuchet_config::DaemonConfig;

fn main() -> ExitCode {
    let config = DaemonConfig::parse();
    if let Err(error) = trebuchetd::run_daemon(&config) {
        tracing::error!(
            target: "trebuchetd::process",
            error = %error,
            "daemon exited with an error"
        );
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
