/// Domain classification and path extension helpers for EDS Page Switcher
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::config::{LIVE_MARKER, PAGE_MARKER, RECOGNIZED_EXTENSIONS};

static EXTENSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\.[a-zA-Z0-9]+)$").expect("extension pattern is valid"));

static VALID_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9\-_.]*[a-zA-Z0-9]$").expect("domain pattern is valid")
});

/// Which side of a mapping a domain lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Served by EDS (`*.aem.live` or `*.aem.page`)
    Published,
    /// The site's own hosting
    Original,
}

impl Family {
    pub fn of(hostname: &str) -> Family {
        if is_published_domain(hostname) {
            Family::Published
        } else {
            Family::Original
        }
    }
}

pub fn is_published_domain(hostname: &str) -> bool {
    hostname.contains(PAGE_MARKER) || hostname.contains(LIVE_MARKER)
}

/// Page-classification query: does this URL point at an EDS page?
/// Anything that fails to parse is not.
pub fn is_eds_page(url: &str) -> bool {
    hostname_of(url).is_some_and(|host| is_published_domain(&host))
}

/// Lowercase hostname of a URL, if it parses and has one
pub fn hostname_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .map(|host| host.to_lowercase())
}

/// Answer to the content script's `getPageInfo` query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageInfo {
    #[serde(rename = "isEDS")]
    pub is_eds: bool,
    pub url: String,
    pub hostname: String,
}

impl PageInfo {
    pub fn detect(url: &str) -> PageInfo {
        let hostname = hostname_of(url).unwrap_or_default();
        PageInfo {
            is_eds: is_published_domain(&hostname),
            url: url.to_string(),
            hostname,
        }
    }
}

/// Remove one trailing recognized extension (case-insensitive).
/// Paths without one come back unchanged.
pub fn strip_known_extension(path: &str) -> &str {
    let bytes = path.as_bytes();
    for ext in RECOGNIZED_EXTENSIONS {
        if bytes.len() >= ext.len()
            && bytes[bytes.len() - ext.len()..].eq_ignore_ascii_case(ext.as_bytes())
        {
            return &path[..path.len() - ext.len()];
        }
    }
    path
}

/// True if the path ends in something that looks like a file extension
pub fn has_extension(path: &str) -> bool {
    EXTENSION_SUFFIX.is_match(path)
}

/// Extension a sample URL path uses, if any.
///
/// Recognized extensions are returned in their canonical lowercase form;
/// any other suffix is returned exactly as written.
pub fn detect_file_extension(path: &str) -> Option<String> {
    let lower = path.to_ascii_lowercase();
    if let Some(ext) = RECOGNIZED_EXTENSIONS.iter().find(|ext| lower.ends_with(*ext)) {
        return Some(ext.to_string());
    }

    EXTENSION_SUFFIX
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// The other EDS environment for a published domain (`.aem.page` <-> `.aem.live`)
pub fn complementary_domain(domain: &str) -> Option<String> {
    if domain.contains(PAGE_MARKER) {
        Some(domain.replacen(PAGE_MARKER, LIVE_MARKER, 1).to_lowercase())
    } else if domain.contains(LIVE_MARKER) {
        Some(domain.replacen(LIVE_MARKER, PAGE_MARKER, 1).to_lowercase())
    } else {
        None
    }
}

/// Reduce user input like `https://Example.com/path` to `example.com`
pub fn clean_domain(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);

    without_scheme
        .split('/')
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

pub fn is_valid_domain(domain: &str) -> bool {
    VALID_DOMAIN.is_match(domain) && domain.contains('.')
}
