pub(crate) fn collapse_whitespace(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}', '\u{a0}'], " ");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn normalize_zip(value: &str) -> String {
    value.trim().to_string()
}

/// Strips currency decoration (`$`, thousands separators, whitespace) from a cell.
pub(crate) fn strip_currency(value: &str) -> String {
    value
        .chars()
        .filter(|ch| *ch != '$' && *ch != ',')
        .collect::<String>()
        .trim()
        .to_string()
}

pub(crate) fn parse_money(value: &str) -> Option<f64> {
    let cleaned = strip_currency(value);
    if cleaned.is_empty() {
        return None;
    }
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| collapse_whitespace(&raw))
        .filter(|cleaned| !cleaned.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_whitespace_removes_invisible_characters() {
        assert_eq!(
            collapse_whitespace("\u{feff}Blue  Cross\u{a0}Basic "),
            "Blue Cross Basic"
        );
    }

    #[test]
    fn parse_money_accepts_currency_formatting() {
        assert_eq!(parse_money("$1,234.50"), Some(1234.5));
        assert_eq!(parse_money(" 42 "), Some(42.0));
        assert_eq!(parse_money(""), None);
        assert_eq!(parse_money("n/a"), None);
        assert_eq!(parse_money("-3"), None);
    }
}
