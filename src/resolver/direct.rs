//! Direct media URLs.
//!
//! For some kinds a playable stream URL can be derived instead of embedding the
//! viewer page. One family of kinds needs a secondary provider lookup; the rest
//! follow per-vendor templates over the record fields. Every builder returns
//! `None` when the record lacks what it needs, and the caller falls back to the
//! viewer.

use std::collections::HashSet;

use crate::models::{ProviderField, RawProviderRecord};

/// Legacy kinds served by the secondary video URL lookup.
pub const LEGACY_SECONDARY_KINDS: &[&str] = &["MODE", "GG", "N", "E", "V", "y", "m", "F", "Q", "c"];

/// Seoul ids at or below this number live on the first stream server.
const SEOUL_SERVER_THRESHOLD: u32 = 500;
const SEOUL_STREAM_HOSTS: [&str; 2] = [
    "https://topiscctv1.eseoul.go.kr",
    "https://topiscctv2.eseoul.go.kr",
];

const RTMP_DEFAULT_PORT: &str = "1935";

/// Media port is the control port plus this offset.
const O_MEDIA_PORT_OFFSET: u16 = 10000;

const P_STREAM_BASE: &str = "https://cctvstream.utic.go.kr/live";

/// `CCTVIP` prefixes that are DVR-relative paths, not addresses.
const DVR_PATH_PREFIXES: &[&str] = &["dvr/", "/dvr", "nvr/", "/nvr"];

type TemplateFn = fn(&str, &RawProviderRecord) -> Option<String>;

/// How a kind obtains its direct media URL.
#[derive(Clone, Copy)]
pub(crate) enum DirectStrategy {
    /// Ask the provider's secondary lookup, keyed by the returned field value.
    SecondaryLookup,
    /// Build the URL from the camera id and record fields.
    Template(TemplateFn),
}

/// Kind-to-strategy table.
///
/// The secondary-lookup kinds are configurable; the template kinds are fixed.
#[derive(Debug, Clone)]
pub struct DirectMediaTable {
    secondary_kinds: HashSet<String>,
}

impl DirectMediaTable {
    /// Table routing `secondary_kinds` to the secondary lookup.
    pub fn new<I, S>(secondary_kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DirectMediaTable {
            secondary_kinds: secondary_kinds.into_iter().map(Into::into).collect(),
        }
    }

    /// Table routing every legacy kind to the secondary lookup.
    pub fn legacy() -> Self {
        Self::new(LEGACY_SECONDARY_KINDS.iter().copied())
    }

    pub(crate) fn strategy(&self, kind: &str) -> Option<DirectStrategy> {
        // Template kinds take precedence over a configured secondary kind
        let template = match kind {
            "Seoul" => Some(seoul_url as TemplateFn),
            "N" => Some(rtmp_url as TemplateFn),
            "O" => Some(port_offset_url as TemplateFn),
            "P" => Some(fixed_host_url as TemplateFn),
            "d" => Some(dvr_aware_url as TemplateFn),
            _ => None,
        };
        match template {
            Some(build) => Some(DirectStrategy::Template(build)),
            None if self.secondary_kinds.contains(kind) => Some(DirectStrategy::SecondaryLookup),
            None => None,
        }
    }
}

/// Key for the secondary lookup: the IP field, else the auxiliary id.
pub(crate) fn secondary_lookup_key(raw: &RawProviderRecord) -> Option<String> {
    raw.get(ProviderField::CctvIp)
        .or_else(|| raw.get(ProviderField::AuxId))
}

/// Turns the secondary lookup's body into a URL.
///
/// Protocol-relative bodies get `https:`; anything that is not an absolute
/// http(s) URL afterwards is rejected.
pub(crate) fn normalize_secondary_url(body: &str) -> Option<String> {
    let body = body.trim().trim_matches('"');
    let url = match body.strip_prefix("//") {
        Some(rest) => format!("https://{}", rest),
        None => body.to_string(),
    };
    (url.starts_with("https://") || url.starts_with("http://")).then_some(url)
}

fn trailing_number(camera_id: &str) -> Option<u32> {
    let start = camera_id
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    camera_id[start..].parse().ok()
}

fn seoul_url(camera_id: &str, _raw: &RawProviderRecord) -> Option<String> {
    // The number after the region prefix doubles as the channel
    let number = trailing_number(camera_id.get(3..)?)?;
    let host = if number <= SEOUL_SERVER_THRESHOLD {
        SEOUL_STREAM_HOSTS[0]
    } else {
        SEOUL_STREAM_HOSTS[1]
    };
    Some(format!("{}/cctvid/ch{}.stream/playlist.m3u8", host, number))
}

fn rtmp_url(_camera_id: &str, raw: &RawProviderRecord) -> Option<String> {
    let ip = raw.get(ProviderField::CctvIp)?;
    let port = raw
        .get(ProviderField::Port)
        .unwrap_or_else(|| RTMP_DEFAULT_PORT.to_string());
    let mut url = format!("rtmp://{}:{}/live", ip, port);
    if let Some(channel) = raw.get(ProviderField::Channel) {
        url.push('/');
        url.push_str(&channel);
    }
    Some(url)
}

fn port_offset_url(_camera_id: &str, raw: &RawProviderRecord) -> Option<String> {
    let ip = raw.get(ProviderField::CctvIp)?;
    let port: u16 = raw.get(ProviderField::Port)?.parse().ok()?;
    let media_port = port.checked_add(O_MEDIA_PORT_OFFSET)?;
    let channel = raw
        .get(ProviderField::Channel)
        .unwrap_or_else(|| "1".to_string());
    Some(format!(
        "http://{}:{}/live/{}/index.m3u8",
        ip, media_port, channel
    ))
}

fn fixed_host_url(camera_id: &str, raw: &RawProviderRecord) -> Option<String> {
    let stream = raw
        .get(ProviderField::AuxId)
        .unwrap_or_else(|| camera_id.to_string());
    let mut url = format!("{}/{}.stream/playlist.m3u8", P_STREAM_BASE, stream);
    if let Some(channel) = raw.get(ProviderField::Channel) {
        url.push_str("?ch=");
        url.push_str(&urlencoding::encode(&channel));
    }
    Some(url)
}

fn dvr_aware_url(_camera_id: &str, raw: &RawProviderRecord) -> Option<String> {
    let ip = raw.get(ProviderField::CctvIp)?;
    let lowered = ip.to_ascii_lowercase();
    if DVR_PATH_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        return None;
    }
    if lowered.starts_with("http://") || lowered.starts_with("https://") {
        return Some(ip);
    }
    let channel = raw
        .get(ProviderField::Channel)
        .unwrap_or_else(|| "1".to_string());
    Some(format!("http://{}/hls/{}/index.m3u8", ip, channel))
}
