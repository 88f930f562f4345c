//! HTTP preview server for cargo-markdown.
//!
//! Serves a README rendered into a crates.io mockup page, and pushes a reload
//! to every open page whenever the README changes:
//!
//! ```text
//! Browser ──HTTP──► axum server (preview-server)
//!                        │
//!                        ├─► /            README ──► preview-renderer ──► page template
//!                        ├─► /ws.js       hot reload client script
//!                        ├─► /theme.css   CSS from the selected theme
//!                        ├─► /highlight.css  colours for highlighted code
//!                        │
//!                        ├─► /ws          WebSocket hub (sub-protocol `hot_reload`)
//!                        │       │
//!                        │       └─► LiveReloadManager ◄── notify
//!                        │
//!                        └─► static assets, anything else ──► 308 /
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::PathBuf;
//! use preview_server::{PreviewServer, ServerConfig, shutdown_signal};
//!
//! # async fn run() -> Result<(), preview_server::ServerError> {
//! let config = ServerConfig {
//!     readme_path: PathBuf::from("README.md"),
//!     port: 0,
//!     ..ServerConfig::default()
//! };
//!
//! let server = PreviewServer::bind(config).await?;
//! println!("previewing at {}", server.url());
//! server.serve(shutdown_signal()).await?;
//! # Ok(())
//! # }
//! ```

mod app;
mod error;
mod handlers;
mod live_reload;
mod metadata;
mod middleware;
mod state;
mod static_files;

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use preview_reload::protocol::{DEFAULT_RETRY_DELAY, Endpoint};
use preview_reload::script::{self, ScriptParams};
use preview_renderer::ReadmeRenderer;
use preview_theme::ThemeVariant;
use tokio::net::TcpListener;

pub use error::ServerError;
pub use live_reload::{DEFAULT_DEBOUNCE, ReloadEvent, ReloadHandle, WatchError};

use live_reload::LiveReloadManager;
use state::{AppState, HotReload};

/// Name of the reloaded resource, used in the client's close reason.
const RESOURCE: &str = "readme";

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on (0 lets the OS choose).
    pub port: u16,
    /// README file to preview.
    pub readme_path: PathBuf,
    /// Theme variant for `/theme.css`.
    pub theme: ThemeVariant,
    /// Enable hot reload.
    pub hot_reload_enabled: bool,
    /// Hostname the browser uses for the hot reload socket.
    pub public_host: Option<String>,
    /// Browser reconnect delay.
    pub retry_delay: Duration,
    /// Quiet period before a file change is broadcast.
    pub debounce: Duration,
    /// Extra glob patterns, relative to the README directory.
    pub watch_patterns: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: preview_config::DEFAULT_HOST.to_owned(),
            port: 8080,
            readme_path: PathBuf::from("README.md"),
            theme: ThemeVariant::default(),
            hot_reload_enabled: true,
            public_host: None,
            retry_delay: DEFAULT_RETRY_DELAY,
            debounce: DEFAULT_DEBOUNCE,
            watch_patterns: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Create server configuration from the loaded config file and CLI.
    #[must_use]
    pub fn from_config(config: &preview_config::Config, readme_path: PathBuf) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            readme_path,
            theme: config.theme.variant,
            hot_reload_enabled: config.hot_reload.enabled,
            public_host: config.hot_reload.public_host.clone(),
            retry_delay: Duration::from_millis(config.hot_reload.retry_delay_ms),
            debounce: Duration::from_millis(config.hot_reload.debounce_ms),
            watch_patterns: config.hot_reload.watch_patterns.clone(),
        }
    }
}

/// A bound, not yet serving, preview server.
pub struct PreviewServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    router: Router,
    reload: Option<ReloadHandle>,
    endpoint: Option<Endpoint>,
    // Keeps the file watcher alive while serving.
    _live_reload: Option<LiveReloadManager>,
}

impl PreviewServer {
    /// Bind the listener and start watching the README.
    ///
    /// # Errors
    ///
    /// Returns an error if the README is missing, the theme fails to load,
    /// the address cannot be bound or the watcher cannot start.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        if !config.readme_path.is_file() {
            return Err(ServerError::ReadmeNotFound(config.readme_path));
        }

        let theme_css = config.theme.document()?.to_css();

        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;
        tracing::info!(address = %local_addr, readme = %config.readme_path.display(), "Server bound");

        let (hot_reload, live_reload, endpoint) = if config.hot_reload_enabled {
            // The browser needs the actual port, so this waits for the bind.
            let endpoint = Endpoint::for_page(
                config.public_host.as_deref(),
                &config.host,
                local_addr.port(),
            );
            let script = script::render(&ScriptParams {
                endpoint: &endpoint,
                retry_delay: config.retry_delay,
                resource: RESOURCE,
            });

            let resource = config.readme_path.file_name().map_or_else(
                || RESOURCE.to_owned(),
                |name| name.to_string_lossy().into_owned(),
            );
            let handle = ReloadHandle::new(resource);
            let mut manager =
                LiveReloadManager::new(&config.readme_path, &config.watch_patterns, handle.clone())?
                    .with_debounce(config.debounce);
            manager.start()?;

            tracing::info!(%endpoint, "Hot reload enabled");
            (Some(HotReload { script, handle }), Some(manager), Some(endpoint))
        } else {
            (None, None, None)
        };

        let reload = hot_reload.as_ref().map(|h| h.handle.clone());
        let state = Arc::new(AppState {
            readme_path: config.readme_path,
            renderer: ReadmeRenderer::new(),
            theme: config.theme,
            theme_css,
            highlight_css: preview_renderer::highlight::stylesheet(),
            hot_reload,
        });

        Ok(Self {
            listener,
            local_addr,
            router: app::create_router(state),
            reload,
            endpoint,
            _live_reload: live_reload,
        })
    }

    /// Address the server is bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// URL of the preview page.
    #[must_use]
    pub fn url(&self) -> String {
        let mut addr = self.local_addr;
        if addr.ip().is_unspecified() {
            addr.set_ip(std::net::Ipv4Addr::LOCALHOST.into());
        }
        format!("http://{addr}")
    }

    /// Reload broadcast, when hot reload is enabled.
    #[must_use]
    pub fn reload_handle(&self) -> Option<&ReloadHandle> {
        self.reload.as_ref()
    }

    /// Endpoint advertised to the browser, when hot reload is enabled.
    #[must_use]
    pub fn hot_reload_endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    /// The application router, for driving requests without the listener.
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `shutdown` completes.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails while running.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(address = %self.local_addr, "Starting server");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Wait for shutdown signal (Ctrl-C).
pub async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
