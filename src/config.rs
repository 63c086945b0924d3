//! Configuration Module
//!
//! This module reads configuration values from environment variables, provides
//! sensible defaults, and validates key security parameters such as maximum file
//! sizes and decompression limits. It also carries the set of DKIM domains whose
//! failures are too noisy to list in the narrative report.

use anyhow::Result;
use std::collections::BTreeSet;
use std::env;
use std::time::Duration;

/// Organizational domain whose DKIM failures are suppressed unless configured otherwise.
pub const DEFAULT_SUPPRESSED_DKIM_DOMAIN: &str = "amazonses.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub suppressed_dkim_domains: BTreeSet<String>,
    pub max_file_size: usize,
    pub max_decompressed_size: usize,
    pub max_files_in_zip: usize,
    pub max_compression_ratio: f64,
    pub max_filename_length: usize,
    pub dns_timeout: Duration,
    pub dns_cache: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            suppressed_dkim_domains: BTreeSet::from([DEFAULT_SUPPRESSED_DKIM_DOMAIN.to_string()]),
            max_file_size: 10 * 1024 * 1024,
            max_decompressed_size: 100 * 1024 * 1024,
            max_files_in_zip: 1000,
            max_compression_ratio: 1000.0,
            max_filename_length: 256,
            dns_timeout: Duration::from_secs(5),
            dns_cache: true,
        }
    }
}

impl Config {
    /// Creates a new configuration by reading environment variables.
    /// If a variable is missing or empty, a default value is used.
    pub fn new() -> Result<Self> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        // Read max file size or use default 10MB.
        let max_file_size = parsed(&lookup, "DMARC_MAX_FILE_SIZE").unwrap_or(defaults.max_file_size);
        if max_file_size > 500_000_000 {
            return Err(anyhow::anyhow!("Max file size too large (500MB limit)"));
        }

        let max_decompressed_size = parsed(&lookup, "DMARC_MAX_DECOMPRESSED_SIZE")
            .unwrap_or(defaults.max_decompressed_size);
        let max_files_in_zip =
            parsed(&lookup, "DMARC_MAX_FILES_IN_ZIP").unwrap_or(defaults.max_files_in_zip);
        let max_compression_ratio = parsed(&lookup, "DMARC_MAX_COMPRESSION_RATIO")
            .unwrap_or(defaults.max_compression_ratio);
        let max_filename_length =
            parsed(&lookup, "DMARC_MAX_FILENAME_LENGTH").unwrap_or(defaults.max_filename_length);

        let dns_timeout = parsed::<u64, _>(&lookup, "DMARC_DNS_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.dns_timeout);
        if dns_timeout.is_zero() {
            return Err(anyhow::anyhow!("DNS timeout must be at least one second"));
        }

        let dns_cache = parsed(&lookup, "DMARC_DNS_CACHE").unwrap_or(defaults.dns_cache);

        // An explicitly empty list turns suppression off; an unset variable keeps the default.
        let suppressed_dkim_domains = match lookup("DMARC_SUPPRESSED_DKIM_DOMAINS") {
            Some(list) => split_domains(&list),
            None => defaults.suppressed_dkim_domains,
        };

        Ok(Config {
            suppressed_dkim_domains,
            max_file_size,
            max_decompressed_size,
            max_files_in_zip,
            max_compression_ratio,
            max_filename_length,
            dns_timeout,
            dns_cache,
        })
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

/// Splits a comma-separated domain list, dropping blanks. Domains are kept as written.
pub fn split_domains(list: &str) -> BTreeSet<String> {
    list.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}
