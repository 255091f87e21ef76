mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sentinel", about = "Anonymous violation reports with Groth16 proofs")]
struct Cli {
    /// Machine-readable JSON on stdout, no colors or spinners
    #[arg(long, global = true)]
    json: bool,
    /// Config file (default ~/.sentinel/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Write the whistleblower circuit artifact
    Compile {
        /// Output path (default: configured circuit_path)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Development-only Groth16 setup; production keys come from a ceremony
    Setup {
        /// Circuit artifact (default: configured circuit_path)
        #[arg(long)]
        circuit: Option<PathBuf>,
        #[arg(long)]
        pk_out: Option<PathBuf>,
        #[arg(long)]
        vk_out: Option<PathBuf>,
    },
    /// Show kind, header and sizes of an artifact
    Inspect {
        path: PathBuf,
    },
    /// Prove knowledge of a receipt secret and print the verifier payload
    Prove {
        /// Receipt secret, decimal or 0x-hex; `-` reads it from stdin
        secret: String,
        /// Public report tag (default: configured report_tag)
        #[arg(long)]
        tag: Option<String>,
        /// Also write the payload JSON here
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print reportViolationZK calldata for the configured target
        #[arg(long)]
        calldata: bool,
    },
    /// Verify a payload JSON file; exits non-zero on rejection
    Verify {
        payload: PathBuf,
    },
    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigCmd,
    },
}

#[derive(Subcommand)]
enum ConfigCmd {
    /// Print the resolved configuration
    Show,
    /// Set one key in the config file
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    output::set_json_mode(cli.json);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Cmd::Compile { out } => commands::compile::run(config, out)?,
        Cmd::Setup { circuit, pk_out, vk_out } => {
            commands::setup::run(config, circuit, pk_out, vk_out)?
        }
        Cmd::Inspect { path } => commands::inspect::run(&path)?,
        Cmd::Prove { secret, tag, out, calldata } => {
            commands::prove::run(config, secret, tag, out, calldata).await?
        }
        Cmd::Verify { payload } => commands::verify::run(config, &payload)?,
        Cmd::Config { action } => match action {
            ConfigCmd::Show => commands::config::show(config)?,
            ConfigCmd::Set { key, value } => commands::config::set(config, &key, &value)?,
        },
    }
    Ok(())
}
