//! DMARC failure reporter library
//!
//! This library turns DMARC aggregate reports into a summary of SPF and DKIM
//! failures: report parsing, failure classification and grouping, reverse DNS
//! naming of source IPs, rendering, configuration, and input file handling.

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod error;
pub mod file_handlers;
pub mod models;
pub mod renderer;
pub mod resolver;
pub mod xml_parser;

pub use config::Config;
pub use error::{DmarcError, Result};
pub use models::{Mechanism, Record, ReportDocument};
pub use renderer::ReportRenderer;
pub use resolver::NameResolver;
pub use xml_parser::parse_dmarc_xml;
