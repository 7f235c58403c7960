//! syncdnsd - keeps AdGuard Home rewrites in sync with Docker container labels.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match syncdns_cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
