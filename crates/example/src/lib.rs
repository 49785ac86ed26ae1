//! Command-line host for the Bedrock multimodal node.
//!
//! `describe-images` wires a [`Server`] with the default infrastructure
//! plugins, [`NodesPlugin`] and [`BedrockPlugin`], then runs the
//! `bedrockMultimodalInvoke` node over the items of a [job file](job) and
//! prints one JSON result per item.
//!
//! ```text
//! job.json ──▶ Job ──▶ ExecutionContext ──▶ NodeRegistry::execute ──▶ stdout
//!                          (files read)          (one call per item)
//! ```

pub mod job;

pub use job::{Job, JobError, JobItem, mime_type_for};

use aws_config::{BehaviorVersion, Region};
use clap::{Parser, ValueEnum};
use lumen_core_plugins::{DefaultPlugins, TracingFormat, TracingPlugin};
use lumen_node_providers::BedrockPlugin;
use lumen_node_providers::bedrock::NODE_NAME;
use lumen_nodes::{Item, NodeRegistry, NodesPlugin, RegistryError};
use lumen_system::plugin::PluginGroup;
use lumen_system::server::Server;
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use tracing::Level;

/// Describe images with a multimodal model on AWS Bedrock.
#[derive(Parser, Debug)]
#[command(name = "describe-images", version, about)]
pub struct Cli {
    /// Job file with parameters, failure policy, and input items.
    #[arg(required_unless_present = "describe")]
    pub job: Option<PathBuf>,

    /// AWS region override; defaults to the AWS config chain.
    #[arg(long)]
    pub region: Option<String>,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub format: LogFormat,

    /// Log at debug level.
    #[arg(long, short)]
    pub verbose: bool,

    /// Print the node's parameter schema and exit.
    #[arg(long)]
    pub describe: bool,
}

/// Log output format (written to stderr).
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human-readable output.
    Pretty,
    /// Single-line output.
    Compact,
    /// JSON lines.
    Json,
}

impl From<LogFormat> for TracingFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
            LogFormat::Json => Self::Json,
        }
    }
}

/// Errors surfaced by the CLI.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The job file or an attachment could not be loaded.
    #[error(transparent)]
    Job(#[from] JobError),

    /// The node run failed.
    #[error(transparent)]
    Node(#[from] RegistryError),

    /// Writing results failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// Encoding results failed.
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    /// The server was wired without a node registry.
    #[error("node registry is not available")]
    NoRegistry,
}

impl Cli {
    /// Tracing setup for the chosen verbosity and format.
    #[must_use]
    pub fn tracing_plugin(&self) -> TracingPlugin {
        let level = if self.verbose { Level::DEBUG } else { Level::INFO };
        TracingPlugin::new()
            .with_level(level)
            .with_format(self.format.into())
    }

    /// Loads AWS config (honouring `--region`) and builds the Bedrock plugin.
    pub async fn bedrock_plugin(&self) -> BedrockPlugin {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        BedrockPlugin::from_sdk_config(loader.load().await)
    }

    /// Runs the command.
    ///
    /// # Errors
    ///
    /// Returns a [`CliError`] if the job cannot be loaded, the node run
    /// aborts, or the output cannot be written.
    pub async fn run(self) -> Result<(), CliError> {
        let mut server = Server::new();
        server.add_plugins(
            DefaultPlugins
                .build()
                .disable::<TracingPlugin>()
                .add(self.tracing_plugin()),
        );
        server.add_plugins(NodesPlugin);
        server.add_plugins(self.bedrock_plugin().await);
        server.finish();

        let registry = registry_snapshot(&server)?;

        if self.describe {
            let description = registry
                .get(NODE_NAME)
                .map(|node| node.description())
                .ok_or_else(|| RegistryError::UnknownNode(NODE_NAME.to_string()))?;
            return write_json(&serde_json::to_value(description)?);
        }

        let Some(path) = &self.job else {
            return Ok(());
        };
        let job = Job::load(path)?;
        tracing::info!(job = %path.display(), items = job.items.len(), "loaded job");

        let ctx = job.into_context()?;
        let output = registry.execute(NODE_NAME, &ctx).await?;

        let failed = output.iter().filter(|item| item.json.contains_key("error")).count();
        if failed > 0 {
            tracing::warn!(failed, total = output.len(), "some items failed");
        }

        write_json(&Value::Array(output.iter().map(Item::json_value).collect()))
    }
}

/// Copies the sealed registry out of the server.
///
/// Nodes are shared `Arc`s, so the copy is cheap, and no lock on the server's
/// globals is held while a node run is awaited.
///
/// # Errors
///
/// Returns [`CliError::NoRegistry`] if [`NodesPlugin`] was not added.
pub fn registry_snapshot(server: &Server) -> Result<NodeRegistry, CliError> {
    server
        .get_global::<NodeRegistry>()
        .map(|registry| NodeRegistry::clone(&registry))
        .ok_or(CliError::NoRegistry)
}

fn write_json(value: &Value) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
