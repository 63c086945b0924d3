//! Data Models Module
//!
//! This module defines the in-memory form of one DMARC aggregate report: its
//! metadata, the published policy, and the ordered list of records with their
//! SPF and DKIM results. Auth-result blocks are normalized at parse time into
//! plain lists, so a record with one `<spf>` and a record with several look the
//! same to everything downstream.

use crate::error::{DmarcError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Result token that counts as success for either mechanism.
pub const PASS: &str = "pass";

/// Authentication mechanism reported in `<auth_results>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mechanism {
    Spf,
    Dkim,
}

impl Mechanism {
    /// Element name used for the mechanism inside `<auth_results>`.
    pub fn tag(self) -> &'static str {
        match self {
            Mechanism::Spf => "spf",
            Mechanism::Dkim => "dkim",
        }
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mechanism::Spf => write!(f, "SPF"),
            Mechanism::Dkim => write!(f, "DKIM"),
        }
    }
}

/// Inclusive reporting window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Builds a range from epoch seconds, rejecting out-of-range values and `begin > end`.
    pub fn from_epoch(begin: i64, end: i64) -> Result<Self> {
        let to_time = |secs: i64| {
            DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(|| {
                DmarcError::MalformedReport(format!("timestamp {} is out of range", secs))
            })
        };
        let (begin, end) = (to_time(begin)?, to_time(end)?);
        if begin > end {
            return Err(DmarcError::MalformedReport(format!(
                "date range begins after it ends ({} > {})",
                begin.timestamp(),
                end.timestamp()
            )));
        }
        Ok(DateRange { begin, end })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";
        write!(f, "{}..{}", self.begin.format(FORMAT), self.end.format(FORMAT))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetadata {
    pub org_name: String,
    pub report_id: String,
    pub email: Option<String>,
    pub date_range: DateRange,
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct PolicyPublished {
    pub domain: String,
    pub adkim: AlignmentMode,
    pub aspf: AlignmentMode,
    pub policy: PolicyType,
    pub subdomain_policy: Option<PolicyType>,
    pub pct: u8,
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub enum AlignmentMode {
    #[default]
    Relaxed,
    Strict,
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub enum PolicyType {
    #[default]
    None,
    Quarantine,
    Reject,
}

impl fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentMode::Relaxed => write!(f, "relaxed"),
            AlignmentMode::Strict => write!(f, "strict"),
        }
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyType::None => write!(f, "none"),
            PolicyType::Quarantine => write!(f, "quarantine"),
            PolicyType::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for AlignmentMode {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "r" | "relaxed" => Ok(AlignmentMode::Relaxed),
            "s" | "strict" => Ok(AlignmentMode::Strict),
            _ => Err(format!("Invalid alignment mode: {}", s)),
        }
    }
}

impl FromStr for PolicyType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(PolicyType::None),
            "quarantine" => Ok(PolicyType::Quarantine),
            "reject" => Ok(PolicyType::Reject),
            _ => Err(format!("Invalid policy type: {}", s)),
        }
    }
}

/// DMARC-level outcome from `<policy_evaluated>`, kept as the raw tokens.
#[derive(Debug, Serialize, Clone, PartialEq, Eq, Default)]
pub struct PolicyEvaluated {
    pub disposition: String,
    pub dkim: String,
    pub spf: String,
}

/// One `<spf>` or `<dkim>` entry of `<auth_results>`.
///
/// Fields are optional because reporters do omit them; the classifier decides
/// what a missing field means.
#[derive(Debug, Serialize, Clone, PartialEq, Eq, Default)]
pub struct AuthResult {
    pub(crate) domain: Option<String>,
    pub(crate) result: Option<String>,
    /// DKIM selector or SPF scope.
    pub(crate) detail: Option<String>,
}

impl AuthResult {
    pub fn new(domain: impl Into<String>, result: impl Into<String>) -> Self {
        AuthResult {
            domain: Some(domain.into()),
            result: Some(result.into()),
            detail: None,
        }
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn require_domain(&self, mechanism: Mechanism) -> Result<&str> {
        self.domain().ok_or(DmarcError::MissingField {
            mechanism: mechanism.tag(),
            field: "domain",
        })
    }

    pub fn require_result(&self, mechanism: Mechanism) -> Result<&str> {
        self.result().ok_or(DmarcError::MissingField {
            mechanism: mechanism.tag(),
            field: "result",
        })
    }
}

/// One `<record>` row. Read-only once parsed.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Record {
    pub(crate) source_ip: String,
    pub(crate) count: u64,
    pub(crate) header_from: String,
    pub(crate) envelope_from: Option<String>,
    pub(crate) policy_evaluated: PolicyEvaluated,
    pub(crate) spf: Vec<AuthResult>,
    pub(crate) dkim: Vec<AuthResult>,
}

impl Record {
    pub fn source_ip(&self) -> &str {
        &self.source_ip
    }

    /// Number of messages covered by this row; always at least one.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn header_from(&self) -> &str {
        &self.header_from
    }

    pub fn envelope_from(&self) -> Option<&str> {
        self.envelope_from.as_deref()
    }

    pub fn policy_evaluated(&self) -> &PolicyEvaluated {
        &self.policy_evaluated
    }

    /// Normalized result list for a mechanism, in document order.
    pub fn results(&self, mechanism: Mechanism) -> &[AuthResult] {
        match mechanism {
            Mechanism::Spf => &self.spf,
            Mechanism::Dkim => &self.dkim,
        }
    }

    pub fn has_spf(&self) -> bool {
        !self.spf.is_empty()
    }

    pub fn has_dkim(&self) -> bool {
        !self.dkim.is_empty()
    }

    /// Every domain named for the mechanism, whatever its result.
    pub fn domains(&self, mechanism: Mechanism) -> BTreeSet<String> {
        self.results(mechanism)
            .iter()
            .filter_map(|r| r.domain.clone())
            .collect()
    }

    pub fn spf_domains(&self) -> BTreeSet<String> {
        self.domains(Mechanism::Spf)
    }

    pub fn dkim_domains(&self) -> BTreeSet<String> {
        self.domains(Mechanism::Dkim)
    }
}

/// A fully parsed aggregate report. Built once by [`ReportDocument::parse`].
#[derive(Debug, Serialize, Clone)]
pub struct ReportDocument {
    pub(crate) metadata: ReportMetadata,
    pub(crate) policy: Option<PolicyPublished>,
    pub(crate) records: Vec<Record>,
}

impl ReportDocument {
    pub fn metadata(&self) -> &ReportMetadata {
        &self.metadata
    }

    pub fn policy_published(&self) -> Option<&PolicyPublished> {
        self.policy.as_ref()
    }

    /// Records in document order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Sorted, deduplicated header-from domains across all records.
    pub fn identifiers(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.header_from.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Records whose header-from domain equals `domain` exactly.
    pub fn records_by_identifier<'a>(&'a self, domain: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.records.iter().filter(move |r| r.header_from == domain)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn record(ip: &str, header_from: &str, spf: &[(&str, &str)], dkim: &[(&str, &str)]) -> Record {
        Record {
            source_ip: ip.to_string(),
            count: 1,
            header_from: header_from.to_string(),
            envelope_from: None,
            policy_evaluated: PolicyEvaluated::default(),
            spf: spf.iter().map(|(d, r)| AuthResult::new(*d, *r)).collect(),
            dkim: dkim.iter().map(|(d, r)| AuthResult::new(*d, *r)).collect(),
        }
    }

    pub fn document(records: Vec<Record>) -> ReportDocument {
        ReportDocument {
            metadata: ReportMetadata {
                org_name: "example.net".to_string(),
                report_id: "42".to_string(),
                email: None,
                date_range: DateRange::from_epoch(1483228800, 1483315199).unwrap(),
            },
            policy: None,
            records,
        }
    }
}
