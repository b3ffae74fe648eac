//! Entry point for the `listwatch` binary.

use std::process::ExitCode;

use listwatch_cli::error::exit_code_from_error;

#[tokio::main]
async fn main() -> ExitCode {
    match listwatch_cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(exit_code_from_error(&err))
        },
    }
}
