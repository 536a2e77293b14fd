/// Marker that opens a trailing annotation, e.g. `Red (RGB ff0000)`.
const ANNOTATION_OPEN: &str = " (";

/// Strip a trailing parenthetical annotation and surrounding whitespace.
///
/// Truncation happens at the first `" ("`; a value without one is only trimmed.
pub fn normalize_value(raw: &str) -> &str {
    let head = raw
        .split_once(ANNOTATION_OPEN)
        .map_or(raw, |(head, _)| head);
    head.trim()
}

/// Cell-level form of [`normalize_value`]. Missing stays missing.
pub fn normalize_cell(raw: Option<&str>) -> Option<String> {
    raw.map(|value| normalize_value(value).to_string())
}
