//! Generic viewer page URL.

use url::form_urlencoded;

use crate::config::{UNDEFINED_SENTINEL, VIEWER_PATH};
use crate::models::{ProviderField, RawProviderRecord};

/// Id prefixes whose viewer is only reachable over plain http.
const PLAINTEXT_PREFIXES: &[&str] = &["L02", "L04", "L08"];

/// Scheme for the viewer of `camera_id`, from its first three characters.
pub(crate) fn viewer_scheme(camera_id: &str) -> &'static str {
    let prefix = camera_id.get(..3).unwrap_or(camera_id);
    if PLAINTEXT_PREFIXES.contains(&prefix) {
        "http"
    } else {
        "https"
    }
}

/// Builds the generic viewer URL.
///
/// Parameters are emitted in the order the viewer script reads them, and every
/// missing value is sent as the literal `undefined`. The viewer decodes
/// `cctvName` once itself, so it is percent-encoded twice here.
pub(crate) fn viewer_url(
    viewer_host: &str,
    api_key: &str,
    camera_id: &str,
    kind: Option<&str>,
    raw: &RawProviderRecord,
) -> String {
    let field = |f: ProviderField| raw.get(f).unwrap_or_else(|| UNDEFINED_SENTINEL.to_string());
    let name = raw
        .get(ProviderField::CctvName)
        .map(|name| urlencoding::encode(&name).into_owned())
        .unwrap_or_else(|| UNDEFINED_SENTINEL.to_string());

    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("key", api_key)
        .append_pair("cctvid", camera_id)
        .append_pair("cctvName", &name)
        .append_pair("kind", kind.unwrap_or(UNDEFINED_SENTINEL))
        .append_pair("cctvip", &field(ProviderField::CctvIp))
        .append_pair("cctvch", &field(ProviderField::Channel))
        .append_pair("id", &field(ProviderField::AuxId))
        .append_pair("cctvpasswd", &field(ProviderField::Password))
        .append_pair("cctvport", &field(ProviderField::Port))
        .finish();

    format!(
        "{}://{}{}?{}",
        viewer_scheme(camera_id),
        viewer_host,
        VIEWER_PATH,
        query
    )
}
