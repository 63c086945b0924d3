//! Failure Aggregator Module
//!
//! Groups classified failures across a whole report: SPF failures by domain,
//! DKIM failures by record.

use crate::classifier::failed_domains;
use crate::models::{Mechanism, Record, ReportDocument};
use serde::Serialize;
use std::collections::BTreeSet;

/// Records with at least one failed domain for `mechanism`, in document order.
pub fn records_with_failure(document: &ReportDocument, mechanism: Mechanism) -> Vec<&Record> {
    document
        .records()
        .iter()
        .filter(|r| !failed_domains(r, mechanism).is_empty())
        .collect()
}

pub fn records_with_spf_failure(document: &ReportDocument) -> Vec<&Record> {
    records_with_failure(document, Mechanism::Spf)
}

pub fn records_with_dkim_failure(document: &ReportDocument) -> Vec<&Record> {
    records_with_failure(document, Mechanism::Dkim)
}

/// Source IPs per failing domain, keyed in first-seen order.
///
/// An IP appears once per record that failed for the domain, so repeats are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DomainFailures {
    entries: Vec<(String, Vec<String>)>,
}

impl DomainFailures {
    fn push(&mut self, domain: &str, ip: &str) {
        match self.entries.iter_mut().find(|(d, _)| d == domain) {
            Some((_, ips)) => ips.push(ip.to_string()),
            None => self
                .entries
                .push((domain.to_string(), vec![ip.to_string()])),
        }
    }

    pub fn get(&self, domain: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(d, _)| d == domain)
            .map(|(_, ips)| ips.as_slice())
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(d, _)| d.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(d, ips)| (d.as_str(), ips.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn spf_failures_by_domain(document: &ReportDocument) -> DomainFailures {
    let mut failures = DomainFailures::default();
    for record in records_with_spf_failure(document) {
        for domain in failed_domains(record, Mechanism::Spf) {
            failures.push(&domain, record.source_ip());
        }
    }
    failures
}

/// A record that failed DKIM, with the display decision already made.
#[derive(Debug, Clone, PartialEq)]
pub struct DkimFailure<'a> {
    pub record: &'a Record,
    pub domains: BTreeSet<String>,
    /// Set when the failed domains are exactly the suppressed set; the record
    /// still counts as a failure but its domain list is not narrated.
    pub suppressed: bool,
}

pub fn dkim_failures<'a>(
    document: &'a ReportDocument,
    suppressed_domains: &BTreeSet<String>,
) -> Vec<DkimFailure<'a>> {
    records_with_dkim_failure(document)
        .into_iter()
        .map(|record| {
            let domains = failed_domains(record, Mechanism::Dkim);
            let suppressed = is_suppressed(&domains, suppressed_domains);
            if suppressed {
                log::debug!("Suppressing DKIM domains for {}", record.source_ip());
            }
            DkimFailure {
                record,
                domains,
                suppressed,
            }
        })
        .collect()
}

/// Exact set equality; an empty suppressed set never matches a real failure.
pub fn is_suppressed(failed: &BTreeSet<String>, suppressed: &BTreeSet<String>) -> bool {
    !failed.is_empty() && failed == suppressed
}
