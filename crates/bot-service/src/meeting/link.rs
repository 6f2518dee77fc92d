//! Meeting link construction.
//!
//! Builds a fully-qualified URL into the hosted video-conferencing
//! service: `{base}/{room}` plus `#`-fragment parameters the service's
//! web client understands. Fragment parameters are client-side-only
//! hints (never sent to the server) and are best-effort: the public
//! deployment may ignore them.
//!
//! The construction is pure and deterministic; the caller resolves the
//! base URL from configuration.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Fragment parameter carrying the meeting title.
const SUBJECT_PARAM: &str = "config.subject";

/// Fragment parameter enabling the pre-join screen (mic/cam check).
const PREJOIN_PARAM: &str = "config.prejoinConfig.enabled=true";

/// Fragment parameter pre-filling the participant's display name.
const DISPLAY_NAME_PARAM: &str = "userInfo.displayName";

/// Characters escaped in fragment parameter values: everything outside
/// the unreserved set (`A-Z a-z 0-9 - _ . ~`) and `/`.
const FRAGMENT_VALUE_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// Build a ready-to-share meeting link.
///
/// - `base_url`: service base URL; a trailing slash is stripped.
/// - `room_slug`: room token, interpolated verbatim (the caller
///   guarantees it is path-safe).
/// - `display_name`: name the video client will suggest for the
///   participant; omitted when `None` or empty.
/// - `subject`: meeting title; omitted when `None` or empty.
///
/// The pre-join parameter is always present, so the fragment is never
/// empty in practice. Optional values are percent-encoded so reserved
/// characters (`&`, spaces, ...) cannot split the fragment.
pub fn build_meeting_link(
    base_url: &str,
    room_slug: &str,
    display_name: Option<&str>,
    subject: Option<&str>,
) -> String {
    let base = base_url.trim_end_matches('/');

    let mut params: Vec<String> = Vec::with_capacity(3);

    if let Some(subject) = subject.filter(|s| !s.is_empty()) {
        params.push(format!(
            "{SUBJECT_PARAM}={}",
            utf8_percent_encode(subject, FRAGMENT_VALUE_ESCAPE)
        ));
    }

    params.push(PREJOIN_PARAM.to_string());

    if let Some(name) = display_name.filter(|s| !s.is_empty()) {
        params.push(format!(
            "{DISPLAY_NAME_PARAM}={}",
            utf8_percent_encode(name, FRAGMENT_VALUE_ESCAPE)
        ));
    }

    let fragment = if params.is_empty() {
        String::new()
    } else {
        format!("#{}", params.join("&"))
    };

    format!("{base}/{room_slug}{fragment}")
}
