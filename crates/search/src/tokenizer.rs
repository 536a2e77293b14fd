use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Separators recognized inside a trait cell. Leftmost alternative wins at a
/// position, so ` - ` is consumed whole before the bare `-` can match.
const DELIMITERS: &str = r",| - |–| to | and |\+|-";

static SPLITTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(DELIMITERS).expect("trait delimiter pattern is valid"));

/// Split a cell into lowercase trait tokens.
///
/// `"Red, White and Pink"` yields `{"pink", "red", "white"}`. Missing input
/// yields the empty set.
pub fn tokenize(value: Option<&str>) -> BTreeSet<String> {
    let Some(value) = value else {
        return BTreeSet::new();
    };
    let lowered = value.to_lowercase();
    SPLITTER
        .split(&lowered)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Union of the tokens of every value.
pub fn tokenize_all<'a>(values: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    values
        .into_iter()
        .flat_map(|value| tokenize(Some(value)))
        .collect()
}
