//! `describe-images` CLI.
//!
//! Runs the AWS Bedrock multimodal node over a job file and prints one JSON
//! result per input item.
//!
//! # Usage
//!
//! ```bash
//! describe-images <job.json> [--region R] [--format pretty|compact|json] [--verbose]
//! describe-images --describe
//! ```
//!
//! AWS credentials come from the default chain. A `.env` file in the working
//! directory is loaded first.

use clap::Parser;
use example::Cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    match Cli::parse().run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "describe-images failed");
            ExitCode::FAILURE
        }
    }
}
