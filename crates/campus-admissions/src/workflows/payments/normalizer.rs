pub(crate) fn normalize_token(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_lowercase()
}

/// Parse a whole-unit amount such as `45000`, `45,000` or `₹45,000.00`.
/// Fractional units other than zero are refused.
pub(crate) fn parse_amount(value: &str) -> Option<u64> {
    let cleaned: String = value
        .chars()
        .filter(|ch| !matches!(ch, ',' | '_' | '₹' | '$') && !ch.is_whitespace())
        .collect();
    let (whole, fraction) = match cleaned.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (cleaned.as_str(), ""),
    };

    if !fraction.chars().all(|ch| ch == '0') {
        return None;
    }

    whole.parse().ok()
}

#[cfg(test)]
pub(crate) fn normalize_for_tests(value: &str) -> String {
    normalize_token(value)
}
