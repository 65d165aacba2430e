//! OpenAPI IR CLI
//!
//! Loads a Swagger/OpenAPI document and writes its intermediate
//! representation as JSON.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use openapi_ir::config::IrConfig;
use openapi_ir::ir::Meta;
use openapi_ir::{IdHasher, OutputFormat, Sha256Hasher, Transformer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "openapi-ir")]
#[command(about = "Convert OpenAPI documents into a normalized IR")]
struct Cli {
    /// Configuration file layered over the default locations
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform a specification file into IR JSON
    Parse {
        /// Input specification (JSON or YAML)
        #[arg(short, long = "in")]
        input: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Write compact JSON
        #[arg(long)]
        compact: bool,
        /// Omit provenance metadata
        #[arg(long)]
        no_meta: bool,
    },

    /// Print the stable id for a sequence of name parts
    Ids {
        /// Parts hashed in order
        #[arg(required = true)]
        parts: Vec<String>,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = IrConfig::load_from(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Parse {
            input,
            out,
            compact,
            no_meta,
        } => {
            let loaded = openapi_ir::load_with_digest(&input).await?;
            let transformer = Transformer::new(config.transform);
            let mut ir = transformer
                .transform(&loaded.document)
                .with_context(|| format!("failed to transform {}", loaded.source))?;

            if config.output.include_meta && !no_meta {
                ir = ir.with_meta(Meta::new(loaded.digest, loaded.source));
            }

            let json = if compact || config.output.format == OutputFormat::Compact {
                serde_json::to_string(&ir)?
            } else {
                serde_json::to_string_pretty(&ir)?
            };

            match out {
                Some(path) => {
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!(
                        path = %path.display(),
                        types = ir.types.len(),
                        operations = ir.operations.len(),
                        "wrote IR"
                    );
                }
                None => println!("{}", json),
            }
        }

        Commands::Ids { parts } => {
            let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
            println!("{}", Sha256Hasher.id_of(&parts));
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
