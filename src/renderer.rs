//! Report Renderer Module
//!
//! Resolves the names of failing sources and formats the result as plain text
//! lines, JSON, or CSV. The resolver is consulted once for every rendered
//! `(record, ip)` occurrence; wrap it in a [`crate::resolver::CachingResolver`]
//! to collapse repeats.

use crate::aggregator::{dkim_failures, spf_failures_by_domain};
use crate::error::Result;
use crate::models::{PolicyPublished, ReportDocument, ReportMetadata};
use crate::resolver::{describe_ip, NameResolver};
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Write;

pub const SPF_HEADING: &str = "------------------ SPF Failures ------------------";
pub const DKIM_HEADING: &str = "------------------ DKIM Failures ------------------";

/// A source IP together with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    pub ip: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpfFailure {
    pub domain: String,
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DkimFailureLine {
    pub source: Source,
    pub domains: Vec<String>,
    pub suppressed: bool,
}

/// Everything a rendering needs, with names already resolved.
#[derive(Debug, Clone, Serialize)]
pub struct FailureSummary<'a> {
    pub metadata: &'a ReportMetadata,
    pub policy: Option<&'a PolicyPublished>,
    pub spf_failures: Vec<SpfFailure>,
    pub dkim_failures: Vec<DkimFailureLine>,
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    mechanism: &'static str,
    domain: &'a str,
    source_ip: &'a str,
    name: &'a str,
    suppressed: bool,
}

pub struct ReportRenderer<'a, R: ?Sized> {
    resolver: &'a R,
    suppressed_dkim_domains: &'a BTreeSet<String>,
}

impl<'a, R: NameResolver + ?Sized> ReportRenderer<'a, R> {
    pub fn new(resolver: &'a R, suppressed_dkim_domains: &'a BTreeSet<String>) -> Self {
        Self {
            resolver,
            suppressed_dkim_domains,
        }
    }

    /// Aggregates the document's failures and resolves every occurrence.
    pub fn summarize<'d>(&self, document: &'d ReportDocument) -> FailureSummary<'d> {
        let spf_failures = spf_failures_by_domain(document)
            .iter()
            .map(|(domain, ips)| SpfFailure {
                domain: domain.to_string(),
                sources: ips.iter().map(|ip| self.source(ip)).collect(),
            })
            .collect();

        let dkim_failures = dkim_failures(document, self.suppressed_dkim_domains)
            .into_iter()
            .map(|failure| DkimFailureLine {
                source: self.source(failure.record.source_ip()),
                domains: failure.domains.into_iter().collect(),
                suppressed: failure.suppressed,
            })
            .collect();

        FailureSummary {
            metadata: document.metadata(),
            policy: document.policy_published(),
            spf_failures,
            dkim_failures,
        }
    }

    /// Text lines of the report.
    pub fn render(&self, document: &ReportDocument) -> Vec<String> {
        self.summarize(document).to_lines()
    }

    fn source(&self, ip: &str) -> Source {
        Source {
            ip: ip.to_string(),
            name: describe_ip(self.resolver, ip),
        }
    }
}

impl FailureSummary<'_> {
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Report Organization: {}", self.metadata.org_name),
            format!("Report ID: {}", self.metadata.report_id),
            format!("Date Range: {}", self.metadata.date_range),
            String::new(),
            SPF_HEADING.to_string(),
        ];
        for failure in &self.spf_failures {
            lines.push(failure.domain.clone());
            for source in &failure.sources {
                lines.push(format!("  {} [{}]", source.name, source.ip));
            }
            lines.push(String::new());
        }
        lines.push(DKIM_HEADING.to_string());
        for failure in &self.dkim_failures {
            lines.push(format!("Source IP: {} ({})", failure.source.ip, failure.source.name));
            if !failure.suppressed {
                lines.push(format!(
                    "Auth failed DKIM domains: {}",
                    failure.domains.join(", ")
                ));
                lines.push(String::new());
            }
        }
        lines
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            crate::error::DmarcError::Format(format!("Failed to serialize summary: {}", e))
        })
    }

    /// Writes one CSV row per SPF occurrence and per failed DKIM domain, header
    /// included.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        self.write_csv_rows(&mut wtr)?;
        wtr.flush()?;
        Ok(())
    }

    /// Appends this summary's rows to `wtr`. The header is written only by the
    /// writer's first row, so several summaries can share one table.
    pub fn write_csv_rows<W: Write>(&self, wtr: &mut csv::Writer<W>) -> Result<()> {
        let csv_error =
            |e: csv::Error| crate::error::DmarcError::Format(format!("Failed to write CSV: {}", e));
        for failure in &self.spf_failures {
            for source in &failure.sources {
                wtr.serialize(CsvRow {
                    mechanism: "spf",
                    domain: &failure.domain,
                    source_ip: &source.ip,
                    name: &source.name,
                    suppressed: false,
                })
                .map_err(csv_error)?;
            }
        }
        for failure in &self.dkim_failures {
            for domain in &failure.domains {
                wtr.serialize(CsvRow {
                    mechanism: "dkim",
                    domain,
                    source_ip: &failure.source.ip,
                    name: &failure.source.name,
                    suppressed: failure.suppressed,
                })
                .map_err(csv_error)?;
            }
        }
        Ok(())
    }
}
