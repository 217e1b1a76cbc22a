//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod context;
pub mod init;
pub mod page;
pub mod resolve;
pub mod submit;
pub mod validate;
pub mod watch;

use crate::cli::panel::headless_registry;
use crate::config::{load_config_or_default, CaredeskConfig};
use crate::core::session::Session;
use tokio::sync::watch as shutdown_watch;

/// Exit code for a configuration problem
pub(crate) const EXIT_CONFIG: i32 = 2;

/// Exit code after a shutdown signal
pub(crate) const EXIT_INTERRUPTED: i32 = 4;

/// Load configuration, printing the problem and returning the exit code on failure
pub(crate) fn load_config(config_path: &str) -> Result<CaredeskConfig, i32> {
    load_config_or_default(config_path).map_err(|e| {
        println!("❌ Failed to load configuration: {config_path}");
        println!("   Error: {e}");
        EXIT_CONFIG
    })
}

/// Open a session with headless panels for every module
pub(crate) fn open_session(config_path: &str, quiet: bool) -> anyhow::Result<Result<Session, i32>> {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(code) => return Ok(Err(code)),
    };
    let session = Session::open(&config, headless_registry(quiet)?)?;
    Ok(Ok(session))
}

/// Resolves once a shutdown has been requested
///
/// Never resolves if the sender is gone without having signalled.
pub(crate) async fn shutdown_requested(shutdown: &mut shutdown_watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
