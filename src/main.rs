//! dmarc-failures - DMARC aggregate report failure summary
//!
//! Reads a DMARC aggregate report (plain XML, GZIP, or ZIP), finds the records that
//! failed SPF or DKIM, and prints them grouped by domain with the reverse DNS names
//! of the sending IPs.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use dmarc_failures::config::{split_domains, Config};
use dmarc_failures::file_handlers::FileHandler;
use dmarc_failures::resolver::{CachingResolver, DnsResolver, NameResolver, NoLookup};
use dmarc_failures::{ReportDocument, ReportRenderer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for dmarc-failures.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Summarize SPF and DKIM failures in a DMARC aggregate report",
    long_about = "dmarc-failures parses a DMARC aggregate report and lists the SPF failures \
                  per domain and the DKIM failures per source, naming each source IP by \
                  reverse DNS.\n\n\
                  USAGE:\n  dmarc-failures <FILE> [--output <text|json|csv>] [--no-dns] [--verbose]"
)]
struct Cli {
    /// Path to the DMARC report (.xml, .gz or .zip)
    #[arg(value_parser)]
    file: PathBuf,

    /// Output format: text, json, csv
    #[arg(short, long, default_value = "text")]
    output: OutputFormat,

    /// Skip reverse DNS lookups
    #[arg(long)]
    no_dns: bool,

    /// DKIM domain set whose failures are listed without domains (repeatable, replaces the configured set)
    #[arg(long = "suppress-dkim-domain", value_name = "DOMAIN")]
    suppress_dkim_domains: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; keep them quiet by default so they never mix with the report.
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "error:".bold().red(), e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = Config::new().context("Failed to load configuration")?;
    if !cli.suppress_dkim_domains.is_empty() {
        config.suppressed_dkim_domains = cli
            .suppress_dkim_domains
            .iter()
            .flat_map(|d| split_domains(d))
            .collect::<BTreeSet<_>>();
    }

    log::info!("Processing file: {}", cli.file.display());
    let inputs = FileHandler::new(&config)
        .load(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;

    // Every report is parsed before anything is printed.
    let documents = inputs
        .iter()
        .map(|bytes| ReportDocument::parse(bytes))
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to parse DMARC report")?;

    let resolver = build_resolver(cli, &config)?;
    let renderer = ReportRenderer::new(resolver.as_ref(), &config.suppressed_dkim_domains);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match cli.output {
        OutputFormat::Text => {
            for (i, document) in documents.iter().enumerate() {
                if i > 0 {
                    writeln!(out)?;
                }
                for line in renderer.render(document) {
                    writeln!(out, "{}", line)?;
                }
            }
        }
        OutputFormat::Json => {
            for document in &documents {
                writeln!(out, "{}", renderer.summarize(document).to_json()?)?;
            }
        }
        OutputFormat::Csv => {
            // One table for the whole archive.
            let mut wtr = csv::Writer::from_writer(&mut out);
            for document in &documents {
                renderer.summarize(document).write_csv_rows(&mut wtr)?;
            }
            wtr.flush()?;
        }
    }
    out.flush()?;

    log::info!("Rendered {} report(s)", documents.len());
    Ok(())
}

fn build_resolver(cli: &Cli, config: &Config) -> Result<Box<dyn NameResolver>> {
    if cli.no_dns {
        return Ok(Box::new(NoLookup));
    }
    let dns = DnsResolver::new(config.dns_timeout).context("Failed to create DNS resolver")?;
    Ok(if config.dns_cache {
        Box::new(CachingResolver::new(dns))
    } else {
        Box::new(dns)
    })
}
