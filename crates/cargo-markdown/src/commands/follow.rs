//! `cargo markdown follow` command implementation.
//!
//! Runs the hot reload client natively against a running preview server,
//! e.g. to rebuild docs or refresh another tool whenever the page would
//! reload.

use std::time::Duration;

use clap::Args;
use preview_reload::{ClientOptions, Endpoint};
use preview_server::shutdown_signal;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the follow command.
#[derive(Args, Debug)]
pub(crate) struct FollowArgs {
    /// Hostname of the preview server.
    #[arg(long, default_value = preview_config::DEFAULT_HOST)]
    pub(crate) host: String,

    /// Port of the preview server.
    #[arg(short, long, default_value_t = 8080)]
    pub(crate) port: u16,

    /// Reconnect delay in milliseconds.
    #[arg(long, default_value_t = 5000)]
    pub(crate) retry_delay_ms: u64,

    /// Shell command to run on every reload.
    #[arg(long, value_name = "CMD")]
    pub(crate) exec: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl FollowArgs {
    /// Execute the follow command.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is invalid.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let endpoint = Endpoint::new(self.host, self.port);
        let options = ClientOptions {
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            ..ClientOptions::default()
        };

        output.banner();
        output.status(&format!("following {endpoint}"));
        match &self.exec {
            Some(command) => output.status(&format!("running `{command}` on reload")),
            None => output.inactive("no reload command"),
        }

        let mut count = 0;
        let mut on_reload = || {
            count += 1;
            output.updates(count);
            if let Some(command) = &self.exec {
                spawn_shell(command);
            }
        };
        preview_reload::run(&endpoint, options, &mut on_reload, shutdown_signal()).await?;

        output.farewell();
        Ok(())
    }
}

/// Start `command` through the platform shell without waiting for it.
fn spawn_shell(command: &str) {
    #[cfg(target_os = "windows")]
    let mut process = {
        let mut process = tokio::process::Command::new("cmd");
        process.args(["/C", command]);
        process
    };
    #[cfg(not(target_os = "windows"))]
    let mut process = {
        let mut process = tokio::process::Command::new("sh");
        process.args(["-c", command]);
        process
    };

    // The runtime reaps the child once it exits.
    match process.spawn() {
        Ok(child) => tracing::info!(command, pid = child.id(), "Started reload command"),
        Err(err) => tracing::error!(command, error = %err, "Failed to start reload command"),
    }
}
