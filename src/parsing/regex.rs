use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Chat markup embedded in exported names, e.g. "<img=2>" or "<col=ff0000>"
    pub static ref RE_NAME_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    // Non-breaking spaces and runs of whitespace collapse to one space
    pub static ref RE_NAME_SPACE: Regex = Regex::new(r"[\s\u{00A0}]+").unwrap();
}

/// Strips markup tags and normalizes spacing in a combatant name.
pub fn sanitize_name(raw: &str) -> String {
    let untagged = RE_NAME_TAG.replace_all(raw, "");
    RE_NAME_SPACE.replace_all(&untagged, " ").trim().to_string()
}
