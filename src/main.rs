//! protobuild CLI entry point
//!
//! Parses arguments, installs logging, and runs the selected command.
//!
//! Exit codes:
//! - a failure reported by `git` or `protoc` exits with that tool's exit code,
//!   after printing the tool's diagnostics verbatim to stderr
//! - any other failure prints the error with its full cause chain and exits 1

use anyhow::Result;
use clap::Parser;
use protobuild::cli;
use protobuild::core::{find_protobuild_error, user_friendly_error};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    cli.init_logging();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            if let Some((error, code)) =
                find_protobuild_error(&e).and_then(|error| error.exit_code().map(|code| (error, code)))
            {
                let diagnostics = error.diagnostics().unwrap_or_default().to_string();
                tracing::debug!("{:#}", e);
                if diagnostics.trim().is_empty() {
                    user_friendly_error(e).display();
                } else {
                    eprint!("{diagnostics}");
                }
                std::process::exit(code);
            }

            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
