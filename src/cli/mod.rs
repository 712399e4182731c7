pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "insure")]
#[command(about = "Insure CLI - development tooling for the insurance platform services")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign, mint and inspect session and service tokens")]
    Token {
        #[command(subcommand)]
        cmd: commands::token::TokenCommands,
    },

    #[command(about = "Call an internal route on a service with the shared service key")]
    Call {
        #[arg(help = "Target service (users, customer-service, quoting-service, benefit-designer-service)")]
        service: String,
        #[arg(help = "Path, e.g. /api/quotes")]
        path: String,
        #[arg(long, help = "JSON body; sends a POST instead of a GET")]
        data: Option<String>,
        #[arg(long, help = "Bearer service token to attach")]
        token: Option<String>,
    },

    #[command(about = "Check /health on one service or all of them")]
    Health {
        #[arg(help = "Service to check (all when omitted)")]
        service: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Token { cmd } => commands::token::handle(cmd, output_format).await,
        Commands::Call {
            service,
            path,
            data,
            token,
        } => commands::call::handle(&service, &path, data.as_deref(), token.as_deref(), output_format).await,
        Commands::Health { service } => commands::health::handle(service.as_deref(), output_format).await,
    }
}
