//! `cargo markdown <README>` command implementation.

use std::path::PathBuf;

use clap::Args;
use preview_config::{CliSettings, Config};
use preview_server::{PreviewServer, ReloadHandle, ServerConfig, shutdown_signal};
use preview_theme::ThemeVariant;
use tokio::sync::broadcast::error::RecvError;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the preview command.
#[derive(Args, Debug)]
pub(crate) struct PreviewArgs {
    /// The path to your readme file.
    #[arg(value_name = "README", required = true)]
    pub(crate) readme: Option<PathBuf>,

    /// The port used by the preview server, 0 lets the OS choose [default: 8080].
    #[arg(short, long)]
    pub(crate) port: Option<u16>,

    /// The hostname used by the hot reload client [default: 127.0.0.1].
    #[arg(long = "host", value_name = "HOSTNAME")]
    pub(crate) public_host: Option<String>,

    /// Automagically open your browser on startup.
    #[arg(short, long)]
    pub(crate) open: bool,

    /// Path to configuration file (default: auto-discover cargo-markdown.toml).
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Theme variant for the mockup page.
    #[arg(long)]
    pub(crate) theme: Option<ThemeVariant>,

    /// Disable hot reload.
    #[arg(long)]
    pub(crate) no_hot_reload: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl PreviewArgs {
    /// Execute the preview command.
    ///
    /// # Errors
    ///
    /// Returns an error if the README is missing, configuration fails or the
    /// server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let settings = self.cli_settings();
        let Some(readme) = self.readme else {
            return Err(CliError::ReadmeNotFound(PathBuf::new()));
        };

        output.banner();
        if !readme.is_file() {
            return Err(CliError::ReadmeNotFound(readme));
        }
        output.status(&format!("found readme at {}", readme.display()));

        let config = Config::load(self.config.as_deref(), Some(&settings))?;
        let server = PreviewServer::bind(ServerConfig::from_config(&config, readme)).await?;
        let url = server.url();

        let reload = server.reload_handle().cloned();
        if reload.is_some() {
            output.status("awaiting updates...");
        } else {
            output.inactive("hot reload");
        }
        output.page(&url);

        if config.browser.open {
            output.status("automagically opening browser...");
            if let Err(err) = webbrowser::open(&url) {
                tracing::warn!(error = %err, "Failed to open browser");
                output.inactive("could not open a browser");
            }
        } else {
            output.inactive("automagic browser opener");
        }

        // Live lines are redrawn in place, so they start below the static ones.
        if let Some(handle) = reload {
            report_activity(handle, output.clone());
        }

        server.serve(shutdown_signal()).await?;
        output.farewell();

        Ok(())
    }

    /// Overrides for the loaded configuration.
    pub(crate) fn cli_settings(&self) -> CliSettings {
        CliSettings {
            port: self.port,
            public_host: self.public_host.clone(),
            hot_reload_enabled: self.no_hot_reload.then_some(false),
            theme: self.theme,
            open_browser: self.open.then_some(true),
        }
    }
}

/// Print the update counter and hot reload connections as they happen.
fn report_activity(handle: ReloadHandle, output: Output) {
    let mut updates = handle.subscribe();
    let mut clients = handle.clients();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                event = updates.recv() => match event {
                    Ok(event) => output.updates(event.count),
                    Err(RecvError::Lagged(_)) => output.updates(handle.count()),
                    Err(RecvError::Closed) => break,
                },
                changed = clients.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if *clients.borrow_and_update() > 0 {
                        output.standing_by();
                    }
                }
            }
        }
    });
}
