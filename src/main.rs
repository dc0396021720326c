//! # tokenfield
//!
//! Command line front end for token-aware rich text fields: decode stored
//! values into documents, encode documents back, search a token catalog and
//! stress the decoder.
//!
//! The catalog is a JSON array of token records:
//!
//! ```text
//! [{"id": "t1", "name": "Doctor Name", "type": {"id": "RP", "name": "Doctor", "color": "#0045ff"}}]
//! ```

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::*;
use stress_test::{stress_test_decode, stress_test_scaling, stress_test_sessions};
use tokenfield_sdk::{
    decode_unresolved, encode, DecodeReport, Document, MemoryResolver, Session, SessionConfig,
    TokenRecord,
};
use tracing::{error, info};


// ─── CLI ───────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "tokenfield")]
#[command(about = "Encode, decode and inspect token-aware rich text")]
#[command(version)]
struct Cli {
    /// Token catalog (JSON array of token records)
    #[arg(short, long, global = true)]
    catalog: Option<PathBuf>,

    /// Session configuration (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a portable string into document JSON
    Decode {
        /// Input file (stdin when omitted)
        input: Option<PathBuf>,

        /// Keep every marker as an unresolved reference; no catalog lookups
        #[arg(long)]
        offline: bool,

        /// Print the markers that stayed literal text
        #[arg(long)]
        report: bool,
    },
    /// Encode document JSON into a portable string
    Encode {
        /// Input file (stdin when omitted)
        input: Option<PathBuf>,
    },
    /// Decode then encode, and say whether the value survived unchanged
    Roundtrip {
        /// Input file (stdin when omitted)
        input: Option<PathBuf>,
    },
    /// Search the token catalog
    Search {
        /// Case-insensitive query over ids, names and types
        #[arg(default_value = "")]
        query: String,
    },
    /// Run the concurrent decode stress tests
    Stress {
        /// Documents per run
        #[arg(long, default_value_t = 200)]
        documents: usize,

        /// Markers per document
        #[arg(long, default_value_t = 8)]
        tokens: usize,

        /// Concurrent lookups per decode
        #[arg(long, default_value_t = 16)]
        limit: usize,

        /// Upper bound of the simulated lookup latency
        #[arg(long, default_value_t = 5)]
        max_latency_ms: u64,

        /// Also sweep concurrency limits from 1 to 32
        #[arg(long)]
        scaling: bool,
    },
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(async_main(cli)) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

async fn async_main(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Decode {
            input,
            offline,
            report,
        } => {
            let text = read_input(input.as_deref())?;
            if offline {
                let doc = decode_unresolved(&text);
                println!("{}", serde_json::to_string_pretty(&doc)?);
                return Ok(());
            }

            let session = open_session(cli.catalog.as_deref(), cli.config.as_deref())?;
            let (doc, decode_report) = session.load_with_report(&text).await?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
            if report {
                print_report(&decode_report);
            }
        }
        Commands::Encode { input } => {
            let json = read_input(input.as_deref())?;
            let doc: Document = serde_json::from_str(&json)?;
            print!("{}", encode(&doc));
        }
        Commands::Roundtrip { input } => {
            let text = read_input(input.as_deref())?;
            let session = open_session(cli.catalog.as_deref(), cli.config.as_deref())?;
            let (_, decode_report) = session.load_with_report(&text).await?;
            let saved = session.save();

            println!("{}", saved);
            if saved == text {
                eprintln!("{} value survived unchanged", "✓".green());
            } else {
                eprintln!("{} value changed on round trip", "✗".yellow());
            }
            print_report(&decode_report);
        }
        Commands::Search { query } => {
            let session = open_session(cli.catalog.as_deref(), cli.config.as_deref())?;
            let records = session.search_tokens(&query).await?;
            info!(query = %query, matches = records.len(), "catalog searched");
            for record in &records {
                print_record(record);
            }
        }
        Commands::Stress {
            documents,
            tokens,
            limit,
            max_latency_ms,
            scaling,
        } => {
            let max_latency = Duration::from_millis(max_latency_ms);

            println!("\n\n╔════════════════════════════════════════════════════════════╗");
            println!("║            ASYNC STRESS TESTS                              ║");
            println!("╚════════════════════════════════════════════════════════════╝");

            let stats = stress_test_decode(documents, tokens, limit, max_latency).await;
            stats.print();
            if !stats.is_clean() {
                return Err("decode stress run found failed tasks, order or round-trip violations".into());
            }

            let stats = stress_test_sessions(documents.min(100), max_latency).await;
            stats.print();
            if stats.failed > 0 {
                return Err("session stress run had failed loads".into());
            }

            if scaling {
                stress_test_scaling(documents, tokens, max_latency).await;
            }

            println!("\n✓ All stress tests completed successfully!");
        }
    }

    Ok(())
}

fn read_input(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn open_session(catalog: Option<&Path>, config: Option<&Path>) -> CliResult<Session> {
    let resolver = match catalog {
        Some(path) => MemoryResolver::from_reader(File::open(path)?)?,
        None => MemoryResolver::new(),
    };
    let config = match config {
        Some(path) => SessionConfig::from_json(&fs::read_to_string(path)?)?,
        None => SessionConfig::default(),
    };
    info!(tokens = resolver.len(), "catalog loaded");
    Ok(Session::with_config(resolver, config)?)
}

fn print_report(report: &DecodeReport) {
    eprintln!(
        "{} resolved, {} kept as text",
        report.resolved.to_string().green(),
        report.unresolved.len().to_string().yellow()
    );
    for fallback in &report.unresolved {
        eprintln!("  {} {}", fallback.marker.bold(), fallback.reason.to_string().dimmed());
    }
}

fn print_record(record: &TokenRecord) {
    let swatch = match hex_rgb(&record.token_type.color) {
        Some((r, g, b)) => "●".truecolor(r, g, b),
        None => "●".normal(),
    };
    println!(
        "{} {:<16} {:<24} {} ({})",
        swatch,
        record.id,
        record.name,
        record.token_type.name,
        record.token_type.id
    );
}

/// Parse `#rrggbb`.
fn hex_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_rgb() {
        assert_eq!(hex_rgb("#0045ff"), Some((0x00, 0x45, 0xff)));
        assert_eq!(hex_rgb("0045ff"), None);
        assert_eq!(hex_rgb("#04f"), None);
        assert_eq!(hex_rgb("#zz45ff"), None);
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::parse_from(["tokenfield", "--catalog", "tokens.json", "decode", "--offline"]);
        assert_eq!(cli.catalog, Some(PathBuf::from("tokens.json")));
        assert!(matches!(cli.command, Commands::Decode { offline: true, .. }));

        let cli = Cli::parse_from(["tokenfield", "stress", "--limit", "4", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Stress { limit: 4, .. }));
    }
}
