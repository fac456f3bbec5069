//! Text and Link Normalization Module
//!
//! Provides functions to:
//! - Canonicalize free text for keyword and grade comparison
//! - Expand compact and spaced grade codes (P4, P 4 -> P-4)
//! - Canonicalize posting links so they can serve as the dedup key

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Grade families recognised when expanding grade codes
pub const GRADE_FAMILIES: &[&str] = &["P", "D", "G", "SB", "LSC", "NO"];

static DEFAULT_GRADE_CODE: LazyLock<Regex> = LazyLock::new(|| {
    grade_code_regex(GRADE_FAMILIES).expect("built-in grade pattern compiles")
});

/// Dash-like code points mapped to the ASCII hyphen
fn is_dash(c: char) -> bool {
    matches!(
        c,
        '\u{2010}'..='\u{2015}' | '\u{2212}' | '\u{FE58}' | '\u{FE63}' | '\u{FF0D}'
    )
}

/// Canonicalize text for comparison
///
/// Normalization rules:
/// 1. Unicode compatibility decomposition (NFKD)
/// 2. Dash variants become '-'
/// 3. Uppercase
/// 4. Whitespace runs collapse to one space, ends trimmed
pub fn normalize(text: &str) -> String {
    let mapped: String = text
        .nfkd()
        .flat_map(char::to_uppercase)
        .nfkd()
        .map(|c| if is_dash(c) { '-' } else { c })
        .collect();

    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build the whole-token grade-code pattern for a set of families
///
/// Matches a family token optionally followed by whitespace and then digits,
/// e.g. `P4`, `P 4`, `LSC10`.
pub fn grade_code_regex<S: AsRef<str>>(families: &[S]) -> Result<Regex, regex::Error> {
    let mut families: Vec<&str> = families.iter().map(|f| f.as_ref()).collect();
    // Longer alternatives first so NO never shadows a longer family
    families.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let alternatives = families
        .iter()
        .map(|f| regex::escape(f))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b({})\s*(\d+)\b", alternatives))
}

/// Rewrite grade codes in already-normalized text as FAMILY-DIGITS
pub fn expand_grade_codes(normalized: &str, pattern: &Regex) -> String {
    pattern.replace_all(normalized, "${1}-${2}").into_owned()
}

/// Full normalization pipeline for a grade string
pub fn normalize_grade(raw: &str) -> String {
    expand_grade_codes(&normalize(raw), &DEFAULT_GRADE_CODE)
}

/// Canonicalize a posting link for deduplication
///
/// Rules:
/// 1. Trim surrounding whitespace
/// 2. Remove fragment
/// 3. Lowercase scheme and host of absolute URLs
/// 4. Remove trailing slash for non-root paths
///
/// Query strings are kept as-is; links without a scheme are only trimmed
/// and de-fragmented.
pub fn canonical_link(link: &str) -> String {
    let link = link.trim();
    let link = match link.find('#') {
        Some(pos) => &link[..pos],
        None => link,
    };

    let (scheme, rest) = match link.find("://") {
        Some(pos) => (&link[..pos], &link[pos + 3..]),
        None => return link.to_string(),
    };

    let (host_port, path_query) = match rest.find(|c: char| c == '/' || c == '?') {
        Some(pos) => (&rest[..pos], &rest[pos..]),
        None => (rest, ""),
    };

    let (path, query) = match path_query.find('?') {
        Some(pos) => (&path_query[..pos], &path_query[pos..]),
        None => (path_query, ""),
    };

    let path = if path.len() > 1 && path.ends_with('/') {
        path.trim_end_matches('/')
    } else {
        path
    };
    let path = if path.is_empty() { "/" } else { path };

    format!(
        "{}://{}{}{}",
        scheme.to_lowercase(),
        host_port.to_lowercase(),
        path,
        query
    )
}
