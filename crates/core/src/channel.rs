//! Marketing channel derivation.

use url::Url;

use crate::limits::DEFAULT_CHANNEL;

/// Traffic attributes of a session as exported.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrafficAttributes<'a> {
    /// Channel already assigned by the exporter, if any
    pub channel: Option<&'a str>,
    pub utm_source: Option<&'a str>,
    pub utm_campaign: Option<&'a str>,
    pub http_referer: Option<&'a str>,
}

/// Derives a business-friendly channel name.
///
/// `site_host` is the store's own host; referrers on it (or its subdomains)
/// are internal navigation, not referrals.
pub fn derive_channel(attrs: TrafficAttributes<'_>, site_host: &str) -> String {
    if let Some(channel) = non_empty(attrs.channel) {
        return channel.to_string();
    }

    let source = non_empty(attrs.utm_source)
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    let campaign = non_empty(attrs.utm_campaign)
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match source.as_str() {
        "gsearch" | "bsearch" | "bing" => return "Paid Search".to_string(),
        "email" => return "Email".to_string(),
        "facebook" | "twitter" | "social" | "socialbook" => return "Social".to_string(),
        "direct" => return DEFAULT_CHANNEL.to_string(),
        _ => {}
    }

    if source.is_empty() {
        return match non_empty(attrs.http_referer) {
            Some(referer) if is_external(referer, site_host) => "Referral".to_string(),
            _ => DEFAULT_CHANNEL.to_string(),
        };
    }

    if campaign.contains("brand") {
        return "Paid Search".to_string();
    }

    title_case(&source)
}

/// Upper-cases the first letter of each word, lower-cases the rest.
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_external(referer: &str, site_host: &str) -> bool {
    let host = match Url::parse(referer) {
        Ok(url) => match url.host_str() {
            Some(host) => host.to_lowercase(),
            None => return false,
        },
        // Unparseable referrers still came from somewhere else.
        Err(_) => return !referer.to_lowercase().contains(&site_host.to_lowercase()),
    };

    let site = site_host.to_lowercase();
    !(host == site || host.ends_with(&format!(".{}", site)))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
