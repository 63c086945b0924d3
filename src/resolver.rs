//! Reverse DNS Module
//!
//! Turns reporting source IPs into host names for display. Lookups are best
//! effort: IPv6 sources are never looked up, and any failure is reported as a
//! placeholder instead of aborting the report. [`CachingResolver`] keeps one
//! answer per address to avoid repeated queries for busy senders.

use crate::error::{DmarcError, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::ResolveErrorKind;
use trust_dns_resolver::Resolver;

pub const IPV6_PLACEHOLDER: &str = "IPv6 address — lookup not attempted";
pub const UNRESOLVED_PLACEHOLDER: &str = "no reverse name available";

/// Maps an IPv4 address to its reverse DNS name.
///
/// `Ok(None)` means the address has no name; `Err` is reserved for transport
/// problems. Callers treat both the same way.
pub trait NameResolver {
    fn resolve(&self, ip: Ipv4Addr) -> Result<Option<String>>;
}

impl<R: NameResolver + ?Sized> NameResolver for &R {
    fn resolve(&self, ip: Ipv4Addr) -> Result<Option<String>> {
        (**self).resolve(ip)
    }
}

impl<R: NameResolver + ?Sized> NameResolver for Box<R> {
    fn resolve(&self, ip: Ipv4Addr) -> Result<Option<String>> {
        (**self).resolve(ip)
    }
}

/// Display text for a source IP: its name, or one of the placeholders.
pub fn describe_ip<R: NameResolver + ?Sized>(resolver: &R, ip: &str) -> String {
    if ip.parse::<Ipv6Addr>().is_ok() {
        log::debug!("Not looking up IPv6 address {}", ip);
        return IPV6_PLACEHOLDER.to_string();
    }
    let Ok(v4) = ip.parse::<Ipv4Addr>() else {
        log::warn!("Source IP {} is not a valid address", ip);
        return UNRESOLVED_PLACEHOLDER.to_string();
    };
    match resolver.resolve(v4) {
        Ok(Some(name)) => name,
        Ok(None) => UNRESOLVED_PLACEHOLDER.to_string(),
        Err(e) => {
            log::warn!("Reverse lookup for {} failed: {}", ip, e);
            UNRESOLVED_PLACEHOLDER.to_string()
        }
    }
}

/// System DNS resolver performing blocking PTR lookups.
pub struct DnsResolver {
    inner: Resolver,
}

impl DnsResolver {
    /// Builds a resolver from the system configuration, falling back to the
    /// library defaults when it cannot be read. Each query gets one attempt.
    pub fn new(timeout: Duration) -> Result<Self> {
        let (config, mut opts) = match trust_dns_resolver::system_conf::read_system_conf() {
            Ok(conf) => conf,
            Err(e) => {
                log::warn!("Could not read system DNS configuration, using defaults: {}", e);
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };
        opts.timeout = timeout;
        opts.attempts = 1;
        let inner = Resolver::new(config, opts)?;
        Ok(Self { inner })
    }
}

impl NameResolver for DnsResolver {
    fn resolve(&self, ip: Ipv4Addr) -> Result<Option<String>> {
        match self.inner.reverse_lookup(IpAddr::V4(ip)) {
            Ok(lookup) => Ok(lookup
                .iter()
                .next()
                .map(|name| name.to_string().trim_end_matches('.').to_string())),
            Err(e) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => Ok(None),
                _ => Err(DmarcError::Resolution(e.to_string())),
            },
        }
    }
}

/// Resolver used when lookups are disabled; every address is unnamed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLookup;

impl NameResolver for NoLookup {
    fn resolve(&self, _ip: Ipv4Addr) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Memoizes answers of another resolver. Failures are cached as "no name".
pub struct CachingResolver<R> {
    inner: R,
    cache: RefCell<HashMap<Ipv4Addr, Option<String>>>,
}

impl<R: NameResolver> CachingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn cache_size(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }
}

impl<R: NameResolver> NameResolver for CachingResolver<R> {
    fn resolve(&self, ip: Ipv4Addr) -> Result<Option<String>> {
        if let Some(cached) = self.cache.borrow().get(&ip) {
            return Ok(cached.clone());
        }
        let answer = match self.inner.resolve(ip) {
            Ok(answer) => answer,
            Err(e) => {
                log::warn!("Reverse lookup for {} failed: {}", ip, e);
                None
            }
        };
        self.cache.borrow_mut().insert(ip, answer.clone());
        Ok(answer)
    }
}
