//! Kind correction by camera id prefix.

/// What to do with the provider-reported `KIND` for ids with a given prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KindRule {
    /// The reported kind is wrong for this prefix; use this one.
    Override(&'static str),
    /// The reported kind is inconsistent for this prefix, but it plays
    /// correctly in the generic viewer, so it is kept as-is.
    TrustReported,
}

/// Prefix rules, matched on the first three characters of the id.
const KIND_RULES: &[(&str, KindRule)] = &[
    ("L01", KindRule::Override("Seoul")),
    ("L02", KindRule::Override("N")),
    ("L03", KindRule::Override("O")),
    ("L04", KindRule::Override("P")),
    ("L06", KindRule::TrustReported),
    ("L08", KindRule::Override("d")),
];

/// Corrected kind for `camera_id`, given the kind the provider reported.
///
/// Returns `None` only when no rule applies and the provider reported nothing.
pub(crate) fn correct_kind(camera_id: &str, reported: Option<&str>) -> Option<String> {
    let rule = KIND_RULES
        .iter()
        .find(|(prefix, _)| camera_id.starts_with(prefix))
        .map(|(_, rule)| *rule);

    match rule {
        Some(KindRule::Override(kind)) => {
            if reported.is_some_and(|r| r != kind) {
                log::debug!(
                    "Correcting kind for {}: {:?} -> {}",
                    camera_id,
                    reported,
                    kind
                );
            }
            Some(kind.to_string())
        }
        Some(KindRule::TrustReported) | None => reported.map(str::to_string),
    }
}
