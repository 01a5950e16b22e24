//! `metadecode`: decode a document or registration metadata to JSON.
//!
//! Reads PATH, or stdin when PATH is omitted. The report goes to stdout;
//! logs go to stderr. Exit status is 0 on success and 1 when a top-level
//! `{"error": ...}` report was written.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use metadecode_harness::config::{DecoderConfig, NETWORK_ENV};
use metadecode_harness::input;
use metadecode_harness::report::error_report;
use metadecode_harness::run::{run, Mode};
use metadecode_kernel::recovery::diagnostics::TracingSink;
use metadecode_registration::address::Network;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "metadecode")]
#[command(about = "Recover layered documents and normalize voting-registration metadata", long_about = None)]
struct Cli {
    /// Log level for stderr (RUST_LOG overrides)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Network for derived addresses: mainnet or testnet (default: NETWORK env)
    #[arg(long, global = true, value_parser = parse_network)]
    network: Option<Network>,

    /// Maximum recursion depth of one recovery pass
    #[arg(long, global = true)]
    max_depth: Option<u32>,

    /// Node visits allowed per decode
    #[arg(long, global = true)]
    max_steps: Option<u32>,

    /// Largest accepted input, in bytes
    #[arg(long, global = true)]
    max_input_bytes: Option<usize>,

    /// Largest output of one decompressed stream, in bytes
    #[arg(long, global = true)]
    max_decompressed_bytes: Option<usize>,

    /// Pretty-print the JSON report
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a signed or plain document, recovering nested encodings
    Document {
        /// Input file (stdin when omitted)
        path: Option<PathBuf>,
    },
    /// Normalize registration metadata (structured binary or JSON)
    Metadata {
        /// Input file (stdin when omitted)
        path: Option<PathBuf>,
    },
}

fn parse_network(s: &str) -> Result<Network, String> {
    Network::from_label(s).ok_or_else(|| format!("unknown network {s:?} (mainnet|testnet)"))
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = DecoderConfig {
        max_depth: cli.max_depth,
        max_steps: cli.max_steps,
        max_input_bytes: cli.max_input_bytes,
        max_decompressed_bytes: cli.max_decompressed_bytes,
        network: cli.network,
    }
    .resolve(std::env::var(NETWORK_ENV).ok().as_deref());
    tracing::debug!(config = %config.to_json(), "resolved decoder config");

    let (mode, path) = match cli.command {
        Commands::Document { path } => (Mode::Document, path),
        Commands::Metadata { path } => (Mode::Metadata, path),
    };

    let (report, ok) = match input::read(path.as_deref(), config.max_input_bytes) {
        Err(e) => (error_report(&e.to_string(), None), false),
        Ok(raw) => match run(mode, &raw, &config, &mut TracingSink) {
            Ok(report) => (report, true),
            Err(e) => (error_report(&e.to_string(), Some(&raw)), false),
        },
    };
    if !ok {
        tracing::error!(error = %report["error"], "decode failed");
    }

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("serializing report")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}").context("writing report to stdout")?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
