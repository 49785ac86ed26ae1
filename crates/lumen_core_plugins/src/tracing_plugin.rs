//! Log output for a Lumen host.
//!
//! [`TracingPlugin`] installs a `tracing-subscriber` registry and publishes
//! its settings as [`TracingConfig`], both during `build()`. Events from
//! plugins built before it are not recorded. Every `ready()` event is, which
//! is where registries report what was registered.
//!
//! Logs are written to stderr. Stdout belongs to whatever drives the host;
//! for the CLI that is the JSON result of a node run.

use crate::{ServerInfo, ServerInfoPlugin};
use lumen_system::plugin::{Plugin, PluginId};
use lumen_system::resource::GlobalResource;
use lumen_system::server::Server;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingFormat {
    /// Multi-line, coloured, for a terminal.
    #[default]
    Pretty,
    /// One line per event.
    Compact,
    /// One JSON object per event, for log shipping.
    Json,
}

/// The logging settings in effect, published as a global.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level used when no directives override it.
    pub level: Level,
    /// Output format.
    pub format: TracingFormat,
    /// Filter directives that were applied, e.g. `lumen_nodes=debug,info`.
    pub directives: String,
}

impl GlobalResource for TracingConfig {}

/// Installs a `tracing` subscriber.
///
/// Depends on [`ServerInfoPlugin`] and logs the host version from
/// [`ServerInfo`] as soon as the subscriber is installed.
///
/// Filter directives are taken from [`with_env_filter`](Self::with_env_filter),
/// else `RUST_LOG`, else the level.
///
/// ```
/// use lumen_core_plugins::{TracingFormat, TracingPlugin};
/// use tracing::Level;
///
/// let ci = TracingPlugin::new()
///     .with_level(Level::DEBUG)
///     .with_format(TracingFormat::Json)
///     .with_env_filter("lumen_node_providers=debug,aws_smithy_runtime=warn");
/// # let _ = ci;
/// ```
#[derive(Debug, Clone)]
pub struct TracingPlugin {
    level: Level,
    format: TracingFormat,
    directives: Option<String>,
    span_events: bool,
}

impl Default for TracingPlugin {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::default(),
            directives: None,
            span_events: false,
        }
    }
}

impl TracingPlugin {
    /// INFO level, pretty output, no span events.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fallback level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets filter directives (`target=level,...`), overriding `RUST_LOG`.
    #[must_use]
    pub fn with_env_filter(mut self, directives: impl Into<String>) -> Self {
        self.directives = Some(directives.into());
        self
    }

    /// Logs span open and close, e.g. one pair per invoked item.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    fn directives(&self) -> String {
        self.directives
            .clone()
            .or_else(|| std::env::var(EnvFilter::DEFAULT_ENV).ok())
            .filter(|directives| EnvFilter::try_new(directives).is_ok())
            .unwrap_or_else(|| self.level.as_str().to_ascii_lowercase())
    }
}

impl Plugin for TracingPlugin {
    fn dependencies(&self) -> Vec<PluginId> {
        vec![PluginId::of::<ServerInfoPlugin>()]
    }

    fn build(&self, server: &mut Server) {
        let directives = self.directives();

        let layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(if self.span_events {
                FmtSpan::NEW | FmtSpan::CLOSE
            } else {
                FmtSpan::NONE
            });
        let layer = match self.format {
            TracingFormat::Pretty => layer.pretty().boxed(),
            TracingFormat::Compact => layer.compact().boxed(),
            TracingFormat::Json => layer.json().boxed(),
        };

        // A subscriber installed by the embedding application takes precedence.
        let installed = tracing_subscriber::registry()
            .with(layer.with_filter(EnvFilter::new(&directives)))
            .try_init()
            .is_ok();

        tracing::debug!(%directives, format = ?self.format, installed, "tracing ready");

        if let Some(info) = server.get_global::<ServerInfo>() {
            tracing::info!(version = info.version, debug = info.debug, "starting host");
        }

        server.insert_global(TracingConfig {
            level: self.level,
            format: self.format,
            directives,
        });
    }
}
