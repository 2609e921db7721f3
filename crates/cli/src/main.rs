//! Vehicle Price Estimator CLI
//!
//! A command-line tool for requesting price estimates, inspecting the
//! model's input schema, and checking service health.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{estimate, schema, status};

/// Vehicle Price Estimator CLI
#[derive(Parser)]
#[command(name = "vpe")]
#[command(author, version, about = "CLI for the Vehicle Price Estimator", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via VPE_API_URL env var)
    #[arg(long, env = "VPE_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate the market value of a vehicle
    Estimate {
        /// Vehicle attribute as NAME=VALUE (repeat for each field)
        #[arg(long = "field", short = 'f', value_name = "NAME=VALUE")]
        fields: Vec<String>,

        /// Read attributes from a JSON file instead of --field flags
        #[arg(long, conflicts_with = "fields")]
        input: Option<String>,
    },

    /// Show the fields an estimation request must supply
    Schema,

    /// Show service health and readiness
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize client
    let client = client::ApiClient::new(&cli.api_url)?;

    // Execute command
    match cli.command {
        Commands::Estimate { fields, input } => {
            estimate::run(&client, fields, input, cli.format).await?;
        }
        Commands::Schema => {
            schema::run(&client, cli.format).await?;
        }
        Commands::Status => {
            status::run(&client, cli.format).await?;
        }
    }

    Ok(())
}
