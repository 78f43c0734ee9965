//! Bookmark icons: the favicon service image, or a colored letter badge.

use crate::config;
use crate::fetch::Fetcher;
use url::Url;

/// How a bookmark tile should draw its icon
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Favicon {
    /// The favicon service returned an image at this URL
    Loaded(String),
    /// Letter badge on a color picked from the palette
    Fallback { letter: char, color: &'static str },
    /// The bookmark URL has no host to build anything from
    Default,
}

/// Host of a bookmark URL, if it has one
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .filter(|h| !h.is_empty())
}

/// Favicon service URL for a bookmark URL, or an empty string without a host
pub fn service_url(url: &str) -> String {
    match host_of(url) {
        Some(host) => config::FAVICON_SERVICE_URL.replace("{}", &host),
        None => String::new(),
    }
}

/// Badge for a host: its uppercased first letter and a palette color keyed on it
pub fn fallback_for_host(host: &str) -> Favicon {
    let Some(first) = host.chars().next() else {
        return Favicon::Default;
    };
    let letter = first.to_uppercase().next().unwrap_or(first);
    let palette = config::FALLBACK_PALETTE;
    let color = palette[letter as u32 as usize % palette.len()];
    Favicon::Fallback { letter, color }
}

/// Try the favicon service once, falling back to the letter badge on failure
pub fn resolve(url: &str, fetcher: &dyn Fetcher) -> Favicon {
    let Some(host) = host_of(url) else {
        return Favicon::Default;
    };

    let icon_url = config::FAVICON_SERVICE_URL.replace("{}", &host);
    match fetcher.fetch(&icon_url) {
        Ok(bytes) if !bytes.is_empty() => Favicon::Loaded(icon_url),
        Ok(_) => {
            log::debug!("Empty favicon for {}", host);
            fallback_for_host(&host)
        }
        Err(e) => {
            log::debug!("Favicon for {} unavailable: {}", host, e);
            fallback_for_host(&host)
        }
    }
}
