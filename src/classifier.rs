//! Failure Classifier Module
//!
//! Pure functions deciding whether a record failed SPF or DKIM and which
//! domains are implicated.

use crate::models::{AuthResult, Mechanism, Record, PASS};
use std::collections::BTreeSet;

/// True when the record carries at least one result for the mechanism.
pub fn has_mechanism(record: &Record, mechanism: Mechanism) -> bool {
    !record.results(mechanism).is_empty()
}

/// Domains whose result for `mechanism` is anything but `pass`, sorted and deduplicated.
///
/// A lone entry and a list of entries take separate paths. In both, an entry is
/// judged by its own result token only, so a passing entry never shows up just
/// because a sibling failed. Entries lacking a domain or a result cannot be
/// judged and are left out.
pub fn failed_domains(record: &Record, mechanism: Mechanism) -> BTreeSet<String> {
    if !has_mechanism(record, mechanism) {
        return BTreeSet::new();
    }
    match record.results(mechanism) {
        [only] => match failing_domain(only, mechanism, record) {
            Some(domain) => BTreeSet::from([domain]),
            None => BTreeSet::new(),
        },
        entries => entries
            .iter()
            .filter_map(|entry| failing_domain(entry, mechanism, record))
            .collect(),
    }
}

fn failing_domain(entry: &AuthResult, mechanism: Mechanism, record: &Record) -> Option<String> {
    let judged = entry.require_result(mechanism).and_then(|result| {
        let domain = entry.require_domain(mechanism)?;
        Ok((result != PASS).then(|| domain.to_string()))
    });
    match judged {
        Ok(domain) => domain,
        Err(e) => {
            log::debug!("Skipping {} entry for {}: {}", mechanism, record.source_ip(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::record;

    fn set(domains: &[&str]) -> BTreeSet<String> {
        domains.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_single_entry() {
        let failing = record("1.1.1.1", "a.com", &[("a.com", "fail")], &[]);
        assert_eq!(failed_domains(&failing, Mechanism::Spf), set(&["a.com"]));

        let passing = record("1.1.1.1", "a.com", &[("a.com", "pass")], &[]);
        assert!(failed_domains(&passing, Mechanism::Spf).is_empty());
    }

    #[test]
    fn test_passing_sibling_is_excluded() {
        let r = record("1.1.1.1", "a.com", &[], &[("d1.com", "pass"), ("d2.com", "fail")]);
        assert_eq!(failed_domains(&r, Mechanism::Dkim), set(&["d2.com"]));
    }

    #[test]
    fn test_multiple_entries_sorted_and_deduplicated() {
        let r = record(
            "1.1.1.1",
            "a.com",
            &[
                ("z.com", "softfail"),
                ("b.com", "temperror"),
                ("z.com", "fail"),
                ("c.com", "pass"),
            ],
            &[],
        );
        let failed: Vec<String> = failed_domains(&r, Mechanism::Spf).into_iter().collect();
        assert_eq!(failed, vec!["b.com", "z.com"]);
    }

    #[test]
    fn test_absent_mechanism() {
        let r = record("1.1.1.1", "a.com", &[], &[("a.com", "fail")]);
        assert!(!has_mechanism(&r, Mechanism::Spf));
        assert!(has_mechanism(&r, Mechanism::Dkim));
        assert!(failed_domains(&r, Mechanism::Spf).is_empty());
    }

    #[test]
    fn test_result_token_is_case_sensitive() {
        let r = record("1.1.1.1", "a.com", &[("a.com", "Pass")], &[]);
        assert_eq!(failed_domains(&r, Mechanism::Spf), set(&["a.com"]));
    }

    #[test]
    fn test_incomplete_entries_are_skipped() {
        let mut r = record("1.1.1.1", "a.com", &[], &[("b.com", "fail")]);
        r.dkim.push(AuthResult {
            domain: None,
            result: Some("fail".to_string()),
            detail: None,
        });
        r.dkim.push(AuthResult {
            domain: Some("c.com".to_string()),
            result: None,
            detail: None,
        });
        assert_eq!(failed_domains(&r, Mechanism::Dkim), set(&["b.com"]));

        let mut lone = record("1.1.1.1", "a.com", &[], &[]);
        lone.spf.push(AuthResult::default());
        assert!(has_mechanism(&lone, Mechanism::Spf));
        assert!(failed_domains(&lone, Mechanism::Spf).is_empty());
    }

    #[test]
    fn test_failed_domains_subset_and_idempotent() {
        let r = record(
            "1.1.1.1",
            "a.com",
            &[("a.com", "fail"), ("b.com", "neutral"), ("c.com", "pass")],
            &[],
        );
        let first = failed_domains(&r, Mechanism::Spf);
        assert!(first.is_subset(&r.spf_domains()));
        assert_eq!(first, failed_domains(&r, Mechanism::Spf));
    }
}
