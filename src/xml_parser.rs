//! XML Parser Module
//!
//! This module parses DMARC aggregate reports into a [`ReportDocument`]. It enforces
//! a nesting depth limit to protect against hostile inputs, and it never expands
//! DTD content: an internal subset is removed before the markup reaches the reader,
//! and a DOCTYPE that defines two or more entities is rejected outright.
//!
//! Every `<spf>` and `<dkim>` element under `<auth_results>` becomes one entry of
//! the record's result list, so a single element and a repeated one end up in the
//! same shape.

use crate::error::{DmarcError, Result};
use crate::models::{
    AlignmentMode, AuthResult, DateRange, Mechanism, PolicyEvaluated, PolicyPublished,
    PolicyType, Record, ReportDocument, ReportMetadata,
};
use quick_xml::escape::unescape;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

/// Deepest element nesting accepted; the aggregate schema never exceeds five.
const MAX_DEPTH: usize = 20;

impl ReportDocument {
    /// Parses raw report bytes. The input must be UTF-8.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let xml = std::str::from_utf8(bytes)
            .map_err(|e| malformed(format!("report is not valid UTF-8: {}", e)))?;
        parse_dmarc_xml(xml)
    }
}

/// Parses the DMARC XML content into a report document.
///
/// # Errors
///
/// Returns an error if the XML is not well formed, if the nesting limit is exceeded,
/// if the DOCTYPE block defines two or more entities, or if `<report_metadata>`,
/// every `<record>`, or one of their mandatory fields is missing.
pub fn parse_dmarc_xml(xml_content: &str) -> Result<ReportDocument> {
    let cleaned_xml = strip_doctype(xml_content)?;
    let mut reader = FeedbackReader::new(&cleaned_xml);

    loop {
        match reader.next()? {
            Event::Start(ref e) if e.name().as_ref() == b"feedback" => break,
            Event::Start(ref e) | Event::Empty(ref e) => {
                return Err(malformed(format!(
                    "unexpected root element <{}>",
                    String::from_utf8_lossy(e.name().as_ref())
                )));
            }
            Event::Eof => return Err(malformed("document has no <feedback> element")),
            _ => {}
        }
    }

    let mut metadata = None;
    let mut policy = None;
    let mut records = Vec::new();

    loop {
        match reader.next()? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"report_metadata" => metadata = Some(parse_report_metadata(&mut reader)?),
                b"policy_published" => policy = Some(parse_policy_published(&mut reader)?),
                b"record" => records.push(parse_record(&mut reader)?),
                _ => reader.skip()?,
            },
            Event::End(_) => break,
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }

    // Drain the trailer so that garbage after the root still surfaces as an error.
    while !matches!(reader.next()?, Event::Eof) {}

    let metadata = metadata.ok_or_else(|| malformed("missing <report_metadata>"))?;
    if records.is_empty() {
        return Err(malformed("report contains no <record> elements"));
    }
    log::info!(
        "Parsed report {} from {} with {} records",
        metadata.report_id,
        metadata.org_name,
        records.len()
    );

    Ok(ReportDocument {
        metadata,
        policy,
        records,
    })
}

/// Removes a DOCTYPE block with an internal subset, rejecting ones that declare
/// two or more entities. A DOCTYPE without a subset is left for the reader.
fn strip_doctype(xml_content: &str) -> Result<String> {
    let Some(start) = xml_content.find("<!DOCTYPE") else {
        return Ok(xml_content.to_string());
    };
    let decl = &xml_content[start..];
    // The subset only exists when `[` opens before the declaration's first `>`.
    let subset = match (decl.find('['), decl.find('>')) {
        (Some(open), Some(close)) if open < close => open,
        _ => return Ok(xml_content.to_string()),
    };
    let Some(end) = decl[subset..].find("]>").map(|i| subset + i + 2) else {
        return Err(malformed("unterminated DOCTYPE internal subset"));
    };
    let doctype = &decl[..end];
    if doctype.matches("<!ENTITY").count() >= 2 {
        return Err(malformed("recursive entities detected"));
    }
    Ok(format!("{}{}", &xml_content[..start], &decl[end..]))
}

/// Event reader that tracks nesting depth.
struct FeedbackReader<'a> {
    reader: Reader<&'a [u8]>,
    depth: usize,
}

impl<'a> FeedbackReader<'a> {
    fn new(xml: &'a str) -> Self {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        FeedbackReader { reader, depth: 0 }
    }

    fn next(&mut self) -> Result<Event<'a>> {
        let event = self.reader.read_event()?;
        match event {
            Event::Start(_) => {
                self.depth += 1;
                if self.depth > MAX_DEPTH {
                    return Err(malformed("XML nesting depth limit exceeded"));
                }
            }
            Event::End(_) => self.depth = self.depth.saturating_sub(1),
            Event::Eof if self.depth > 0 => return Err(unexpected_eof()),
            _ => {}
        }
        Ok(event)
    }

    /// Reads the text of a leaf element whose start tag was just returned by `next`.
    ///
    /// Text is unescaped and CDATA taken verbatim; comments and processing
    /// instructions contribute nothing.
    fn text(&mut self) -> Result<String> {
        let target = self.depth.saturating_sub(1);
        let mut text = String::new();
        while self.depth > target {
            match self.next()? {
                Event::Text(t) => {
                    let raw = std::str::from_utf8(&t).map_err(|e| malformed(e.to_string()))?;
                    text.push_str(&unescape(raw).map_err(|e| malformed(e.to_string()))?);
                }
                Event::CData(c) => {
                    text.push_str(std::str::from_utf8(&c).map_err(|e| malformed(e.to_string()))?)
                }
                Event::Eof => return Err(unexpected_eof()),
                _ => {}
            }
        }
        Ok(text.trim().to_string())
    }

    /// Skips the rest of the element whose start tag was just returned by `next`.
    fn skip(&mut self) -> Result<()> {
        let target = self.depth.saturating_sub(1);
        while self.depth > target {
            if let Event::Eof = self.next()? {
                return Err(unexpected_eof());
            }
        }
        Ok(())
    }
}

/// Walks the children of the current element until its end tag, handing leaf
/// and nested starts to `on_child`. `<x/>` children are reported with empty text.
fn for_each_child<'a, F>(reader: &mut FeedbackReader<'a>, mut on_child: F) -> Result<()>
where
    F: FnMut(&mut FeedbackReader<'a>, &[u8], Child) -> Result<()>,
{
    loop {
        match reader.next()? {
            Event::Start(ref e) => on_child(reader, e.name().as_ref(), Child::Open)?,
            Event::Empty(ref e) => on_child(reader, e.name().as_ref(), Child::Empty)?,
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(unexpected_eof()),
            _ => {}
        }
    }
}

enum Child {
    Open,
    Empty,
}

impl Child {
    /// Text of a leaf child, `None` when it is empty.
    fn text(self, reader: &mut FeedbackReader<'_>) -> Result<Option<String>> {
        match self {
            Child::Open => Ok(Some(reader.text()?).filter(|t| !t.is_empty())),
            Child::Empty => Ok(None),
        }
    }

    fn skip(self, reader: &mut FeedbackReader<'_>) -> Result<()> {
        match self {
            Child::Open => reader.skip(),
            Child::Empty => Ok(()),
        }
    }
}

fn parse_report_metadata(reader: &mut FeedbackReader<'_>) -> Result<ReportMetadata> {
    let mut org_name = None;
    let mut report_id = None;
    let mut email = None;
    let mut date_range = None;
    for_each_child(reader, |reader, name, child| {
        match name {
            b"org_name" => org_name = child.text(reader)?,
            b"report_id" => report_id = child.text(reader)?,
            b"email" => email = child.text(reader)?,
            b"date_range" => match child {
                Child::Open => date_range = Some(parse_date_range(reader)?),
                Child::Empty => return Err(malformed("empty <date_range>")),
            },
            _ => child.skip(reader)?,
        }
        Ok(())
    })?;
    Ok(ReportMetadata {
        org_name: org_name.ok_or_else(|| malformed("missing <org_name>"))?,
        report_id: report_id.ok_or_else(|| malformed("missing <report_id>"))?,
        email,
        date_range: date_range.ok_or_else(|| malformed("missing <date_range>"))?,
    })
}

fn parse_date_range(reader: &mut FeedbackReader<'_>) -> Result<DateRange> {
    let mut begin = None;
    let mut end = None;
    for_each_child(reader, |reader, name, child| {
        match name {
            b"begin" => begin = child.text(reader)?,
            b"end" => end = child.text(reader)?,
            _ => child.skip(reader)?,
        }
        Ok(())
    })?;
    let epoch = |value: Option<String>, field: &str| -> Result<i64> {
        let value = value.ok_or_else(|| malformed(format!("missing <date_range>/<{}>", field)))?;
        value
            .parse()
            .map_err(|_| malformed(format!("invalid <{}> timestamp: {}", field, value)))
    };
    DateRange::from_epoch(epoch(begin, "begin")?, epoch(end, "end")?)
}

/// Parses the `<policy_published>` element.
fn parse_policy_published(reader: &mut FeedbackReader<'_>) -> Result<PolicyPublished> {
    let mut policy = PolicyPublished {
        pct: 100,
        ..Default::default()
    };
    for_each_child(reader, |reader, name, child| {
        match name {
            b"domain" => policy.domain = child.text(reader)?.unwrap_or_default(),
            b"adkim" => {
                policy.adkim = child
                    .text(reader)?
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(AlignmentMode::Relaxed)
            }
            b"aspf" => {
                policy.aspf = child
                    .text(reader)?
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(AlignmentMode::Relaxed)
            }
            b"p" => {
                policy.policy = child
                    .text(reader)?
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(PolicyType::None)
            }
            b"sp" => policy.subdomain_policy = child.text(reader)?.and_then(|t| t.parse().ok()),
            b"pct" => {
                policy.pct = child
                    .text(reader)?
                    .and_then(|t| t.parse().ok())
                    .unwrap_or(100)
            }
            _ => child.skip(reader)?,
        }
        Ok(())
    })?;
    Ok(policy)
}

#[derive(Default)]
struct RowFields {
    source_ip: Option<String>,
    count: Option<String>,
    policy_evaluated: PolicyEvaluated,
}

/// Parses one `<record>` element.
fn parse_record(reader: &mut FeedbackReader<'_>) -> Result<Record> {
    let mut row = RowFields::default();
    let mut header_from = None;
    let mut envelope_from = None;
    let mut spf = Vec::new();
    let mut dkim = Vec::new();

    for_each_child(reader, |reader, name, child| {
        match (name, child) {
            (b"row", Child::Open) => row = parse_row(reader)?,
            (b"identifiers", Child::Open) => {
                for_each_child(reader, |reader, name, child| {
                    match name {
                        b"header_from" => header_from = child.text(reader)?,
                        b"envelope_from" => envelope_from = child.text(reader)?,
                        _ => child.skip(reader)?,
                    }
                    Ok(())
                })?;
            }
            (b"auth_results", Child::Open) => {
                for_each_child(reader, |reader, name, child| {
                    match (name, child) {
                        (b"spf", Child::Open) => {
                            spf.push(parse_auth_result(reader, Mechanism::Spf)?)
                        }
                        (b"dkim", Child::Open) => {
                            dkim.push(parse_auth_result(reader, Mechanism::Dkim)?)
                        }
                        (b"spf", Child::Empty) => spf.push(AuthResult::default()),
                        (b"dkim", Child::Empty) => dkim.push(AuthResult::default()),
                        (_, child) => child.skip(reader)?,
                    }
                    Ok(())
                })?;
            }
            (_, child) => child.skip(reader)?,
        }
        Ok(())
    })?;

    let source_ip = row
        .source_ip
        .ok_or_else(|| malformed("record is missing <source_ip>"))?;
    let count = row
        .count
        .ok_or_else(|| malformed(format!("record for {} is missing <count>", source_ip)))?;
    let count = match count.parse::<u64>() {
        Ok(n) if n >= 1 => n,
        _ => {
            return Err(malformed(format!(
                "record for {} has invalid <count>: {}",
                source_ip, count
            )))
        }
    };
    let header_from = header_from
        .ok_or_else(|| malformed(format!("record for {} is missing <header_from>", source_ip)))?;

    Ok(Record {
        source_ip,
        count,
        header_from,
        envelope_from,
        policy_evaluated: row.policy_evaluated,
        spf,
        dkim,
    })
}

fn parse_row(reader: &mut FeedbackReader<'_>) -> Result<RowFields> {
    let mut row = RowFields::default();
    for_each_child(reader, |reader, name, child| {
        match (name, child) {
            (b"source_ip", child) => row.source_ip = child.text(reader)?,
            (b"count", child) => row.count = child.text(reader)?,
            (b"policy_evaluated", Child::Open) => {
                let evaluated = &mut row.policy_evaluated;
                for_each_child(reader, |reader, name, child| {
                    match name {
                        b"disposition" => {
                            evaluated.disposition = child.text(reader)?.unwrap_or_default()
                        }
                        b"dkim" => evaluated.dkim = child.text(reader)?.unwrap_or_default(),
                        b"spf" => evaluated.spf = child.text(reader)?.unwrap_or_default(),
                        _ => child.skip(reader)?,
                    }
                    Ok(())
                })?;
            }
            (_, child) => child.skip(reader)?,
        }
        Ok(())
    })?;
    Ok(row)
}

/// Parses one `<spf>` or `<dkim>` entry of `<auth_results>`.
fn parse_auth_result(reader: &mut FeedbackReader<'_>, mechanism: Mechanism) -> Result<AuthResult> {
    let mut entry = AuthResult::default();
    for_each_child(reader, |reader, name, child| {
        match (mechanism, name) {
            (_, b"domain") => entry.domain = child.text(reader)?,
            (_, b"result") => entry.result = child.text(reader)?,
            (Mechanism::Dkim, b"selector") | (Mechanism::Spf, b"scope") => {
                entry.detail = child.text(reader)?
            }
            _ => child.skip(reader)?,
        }
        Ok(())
    })?;
    Ok(entry)
}

fn malformed(message: impl Into<String>) -> DmarcError {
    DmarcError::MalformedReport(message.into())
}

fn unexpected_eof() -> DmarcError {
    malformed("unexpected end of document")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<feedback>
  <version>1.0</version>
  <report_metadata>
    <org_name>google.com</org_name>
    <email>noreply-dmarc-support@google.com</email>
    <report_id>5717107811868587391</report_id>
    <date_range>
      <begin>1483228800</begin>
      <end>1483315199</end>
    </date_range>
  </report_metadata>
  <policy_published>
    <domain>example.com</domain>
    <adkim>s</adkim>
    <aspf>r</aspf>
    <p>quarantine</p>
    <sp>reject</sp>
    <pct>50</pct>
  </policy_published>
  <record>
    <row>
      <source_ip>192.0.2.10</source_ip>
      <count>3</count>
      <policy_evaluated>
        <disposition>none</disposition>
        <dkim>fail</dkim>
        <spf>pass</spf>
      </policy_evaluated>
    </row>
    <identifiers>
      <header_from>example.com</header_from>
    </identifiers>
    <auth_results>
      <dkim>
        <domain>example.com</domain>
        <result>fail</result>
        <selector>s1</selector>
      </dkim>
      <dkim>
        <domain>mailer.example</domain>
        <result>pass</result>
      </dkim>
      <spf>
        <domain>example.com</domain>
        <scope>mfrom</scope>
        <result>pass</result>
      </spf>
    </auth_results>
  </record>
  <record>
    <row>
      <source_ip>2001:db8::1</source_ip>
      <count>1</count>
      <policy_evaluated>
        <disposition>quarantine</disposition>
        <dkim>fail</dkim>
        <spf>fail</spf>
      </policy_evaluated>
    </row>
    <identifiers>
      <envelope_from>bounce.example.org</envelope_from>
      <header_from>example.org</header_from>
    </identifiers>
    <auth_results>
      <spf>
        <domain>bounce.example.org</domain>
        <result>softfail</result>
      </spf>
    </auth_results>
  </record>
</feedback>
"#;

    #[test]
    fn test_xml_parsing() {
        let doc = parse_dmarc_xml(REPORT).unwrap();
        let meta = doc.metadata();
        assert_eq!(meta.org_name, "google.com");
        assert_eq!(meta.report_id, "5717107811868587391");
        assert_eq!(meta.email.as_deref(), Some("noreply-dmarc-support@google.com"));
        assert_eq!(meta.date_range.begin.timestamp(), 1483228800);
        assert_eq!(meta.date_range.end.timestamp(), 1483315199);
        assert_eq!(doc.records().len(), 2);
    }

    #[test]
    fn test_policy_published() {
        let doc = parse_dmarc_xml(REPORT).unwrap();
        let policy = doc.policy_published().unwrap();
        assert_eq!(policy.domain, "example.com");
        assert_eq!(policy.adkim, AlignmentMode::Strict);
        assert_eq!(policy.aspf, AlignmentMode::Relaxed);
        assert_eq!(policy.policy, PolicyType::Quarantine);
        assert_eq!(policy.subdomain_policy, Some(PolicyType::Reject));
        assert_eq!(policy.pct, 50);
    }

    #[test]
    fn test_record_fields() {
        let doc = parse_dmarc_xml(REPORT).unwrap();
        let first = &doc.records()[0];
        assert_eq!(first.source_ip(), "192.0.2.10");
        assert_eq!(first.count(), 3);
        assert_eq!(first.header_from(), "example.com");
        assert_eq!(first.envelope_from(), None);
        assert_eq!(
            first.policy_evaluated(),
            &PolicyEvaluated {
                disposition: "none".to_string(),
                dkim: "fail".to_string(),
                spf: "pass".to_string(),
            }
        );

        let second = &doc.records()[1];
        assert_eq!(second.envelope_from(), Some("bounce.example.org"));
        assert_eq!(second.policy_evaluated().disposition, "quarantine");
    }

    #[test]
    fn test_auth_results_are_normalized_to_lists() {
        let doc = parse_dmarc_xml(REPORT).unwrap();
        let first = &doc.records()[0];
        let dkim = first.results(Mechanism::Dkim);
        assert_eq!(dkim.len(), 2);
        assert_eq!(dkim[0].domain(), Some("example.com"));
        assert_eq!(dkim[0].result(), Some("fail"));
        assert_eq!(dkim[0].detail(), Some("s1"));
        assert_eq!(dkim[1].domain(), Some("mailer.example"));

        let spf = first.results(Mechanism::Spf);
        assert_eq!(spf.len(), 1);
        assert_eq!(spf[0].detail(), Some("mfrom"));

        let second = &doc.records()[1];
        assert!(second.has_spf());
        assert!(!second.has_dkim());
    }

    #[test]
    fn test_policy_evaluated_does_not_leak_into_auth_results() {
        let doc = parse_dmarc_xml(REPORT).unwrap();
        let second = &doc.records()[1];
        assert!(second.results(Mechanism::Dkim).is_empty());
        assert_eq!(second.results(Mechanism::Spf).len(), 1);
    }

    #[test]
    fn test_entry_without_domain_is_kept() {
        let xml = REPORT.replace(
            "<domain>mailer.example</domain>",
            "",
        );
        let doc = parse_dmarc_xml(&xml).unwrap();
        let dkim = doc.records()[0].results(Mechanism::Dkim);
        assert_eq!(dkim.len(), 2);
        assert_eq!(dkim[1].domain(), None);
        assert_eq!(dkim[1].result(), Some("pass"));
    }

    #[test]
    fn test_escaped_text_is_unescaped() {
        let xml = REPORT.replace(
            "<org_name>google.com</org_name>",
            "<org_name>Mail &amp; Co</org_name>",
        );
        let doc = parse_dmarc_xml(&xml).unwrap();
        assert_eq!(doc.metadata().org_name, "Mail & Co");
    }

    #[test]
    fn test_cdata_domain_is_read() {
        let xml = REPORT.replace(
            "<domain>bounce.example.org</domain>",
            "<domain><![CDATA[bounce.example.org]]></domain>",
        );
        let doc = parse_dmarc_xml(&xml).unwrap();
        assert_eq!(
            crate::classifier::failed_domains(&doc.records()[1], Mechanism::Spf),
            BTreeSet::from(["bounce.example.org".to_string()])
        );
    }

    #[test]
    fn test_comment_inside_domain_is_ignored() {
        let xml = REPORT.replace(
            "<domain>bounce.example.org</domain>",
            "<domain>bounce.example.org<!-- relayed --></domain>",
        );
        let doc = parse_dmarc_xml(&xml).unwrap();
        let spf = doc.records()[1].results(Mechanism::Spf);
        assert_eq!(spf[0].domain(), Some("bounce.example.org"));
        assert_eq!(
            crate::classifier::failed_domains(&doc.records()[1], Mechanism::Spf),
            BTreeSet::from(["bounce.example.org".to_string()])
        );
    }

    #[test]
    fn test_doctype_without_subset_is_kept() {
        let xml = REPORT
            .replace(
                "<feedback>",
                "<!DOCTYPE feedback SYSTEM \"rua.dtd\">\n<feedback>",
            )
            .replace(
                "<org_name>google.com</org_name>",
                "<org_name>Acme [EU]> Mail</org_name>",
            );
        let doc = parse_dmarc_xml(&xml).unwrap();
        assert_eq!(doc.metadata().org_name, "Acme [EU]> Mail");
        assert_eq!(doc.records().len(), 2);
    }

    #[test]
    fn test_count_above_u32_is_accepted() {
        let xml = REPORT.replace("<count>3</count>", "<count>4294967296</count>");
        let doc = parse_dmarc_xml(&xml).unwrap();
        assert_eq!(doc.records()[0].count(), 4_294_967_296);
    }

    #[test]
    fn test_parse_from_bytes() {
        let doc = ReportDocument::parse(REPORT.as_bytes()).unwrap();
        assert_eq!(doc.records().len(), 2);
        let err = ReportDocument::parse(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_missing_metadata_is_malformed() {
        let start = REPORT.find("<report_metadata>").unwrap();
        let end = REPORT.find("</report_metadata>").unwrap() + "</report_metadata>".len();
        let xml = format!("{}{}", &REPORT[..start], &REPORT[end..]);
        let err = parse_dmarc_xml(&xml).unwrap_err();
        assert!(matches!(err, DmarcError::MalformedReport(_)));
    }

    #[test]
    fn test_missing_records_is_malformed() {
        let xml = r#"<feedback>
            <report_metadata>
                <org_name>x</org_name>
                <report_id>1</report_id>
                <date_range><begin>1</begin><end>2</end></date_range>
            </report_metadata>
        </feedback>"#;
        let err = parse_dmarc_xml(xml).unwrap_err();
        assert!(err.to_string().contains("no <record>"));
    }

    #[test]
    fn test_broken_markup_is_malformed() {
        let truncated = &REPORT[..REPORT.len() / 2];
        assert!(parse_dmarc_xml(truncated).unwrap_err().is_malformed());

        let mismatched = REPORT.replace("</count>", "</cnt>");
        assert!(parse_dmarc_xml(&mismatched).unwrap_err().is_malformed());

        assert!(parse_dmarc_xml("").unwrap_err().is_malformed());
        assert!(parse_dmarc_xml("<report/>").unwrap_err().is_malformed());
    }

    #[test]
    fn test_zero_count_is_malformed() {
        let xml = REPORT.replace("<count>3</count>", "<count>0</count>");
        let err = parse_dmarc_xml(&xml).unwrap_err();
        assert!(err.to_string().contains("invalid <count>"));
    }

    #[test]
    fn test_inverted_date_range_is_malformed() {
        let xml = REPORT.replace("<begin>1483228800</begin>", "<begin>1483315200</begin>");
        assert!(parse_dmarc_xml(&xml).unwrap_err().is_malformed());
    }

    #[test]
    fn test_depth_limit() {
        let mut xml = String::from(
            "<feedback><report_metadata><org_name>x</org_name><report_id>1</report_id>\
             <date_range><begin>1</begin><end>2</end></date_range></report_metadata>",
        );
        xml.push_str(&"<extra>".repeat(30));
        xml.push_str(&"</extra>".repeat(30));
        xml.push_str("</feedback>");
        let err = parse_dmarc_xml(&xml).unwrap_err();
        assert!(err.to_string().contains("depth"));
    }
}
