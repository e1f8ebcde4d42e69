//! Interpretation of debugger expression text.

/// Substrings a debugger uses for a released object.
pub const DISPOSED_MARKERS: &[&str] = &["<disposed>", "disposed", "已释放"];

/// Substrings a debugger uses for a value it could not produce.
pub const UNAVAILABLE_MARKERS: &[&str] = &[
    "<undefined>",
    "<未初始化>",
    "<Unable to read memory>",
];

/// What an expression's value text refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionValue {
    /// The object was released.
    Disposed,
    /// No address could be obtained.
    Unavailable,
    Address(u64),
}

/// Classify expression text before any memory is touched.
pub fn classify_expression(text: &str) -> ExpressionValue {
    let trimmed = text.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("nullptr")
        || UNAVAILABLE_MARKERS.iter().any(|m| trimmed.contains(m))
    {
        return ExpressionValue::Unavailable;
    }
    if DISPOSED_MARKERS.iter().any(|m| trimmed.contains(m)) {
        return ExpressionValue::Disposed;
    }
    match parse_pointer(trimmed) {
        Some(address) => ExpressionValue::Address(address),
        None => ExpressionValue::Unavailable,
    }
}

/// Extract an address from free-form text.
///
/// Takes the first `0x` hex literal; without one, the first run of decimal
/// digits. Values that do not fit in 64 bits yield `None`.
pub fn parse_pointer(text: &str) -> Option<u64> {
    if let Some(digits) = first_hex_literal(text) {
        return u64::from_str_radix(digits, 16).ok();
    }
    first_decimal_run(text).and_then(|digits| digits.parse().ok())
}

fn first_hex_literal(text: &str) -> Option<&str> {
    let mut rest = text;
    while let Some(pos) = rest.find("0x") {
        let after = &rest[pos + 2..];
        let len = after
            .bytes()
            .take_while(|b| b.is_ascii_hexdigit())
            .count();
        if len > 0 {
            return Some(&after[..len]);
        }
        rest = after;
    }
    None
}

fn first_decimal_run(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let tail = &text[start..];
    let len = tail.bytes().take_while(|b| b.is_ascii_digit()).count();
    Some(&tail[..len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_literal() {
        assert_eq!(parse_pointer("0x000001f2a3b4c5d0"), Some(0x1f2a3b4c5d0));
        assert_eq!(
            parse_pointer("{OpenCvSharp.Mat} 0x7ffe1000 (rows 12)"),
            Some(0x7ffe1000)
        );
    }

    #[test]
    fn test_hex_preferred_over_earlier_decimal() {
        assert_eq!(parse_pointer("Mat 12 rows @ 0xABC"), Some(0xABC));
    }

    #[test]
    fn test_bare_0x_is_skipped() {
        assert_eq!(parse_pointer("0x then 0x10"), Some(0x10));
    }

    #[test]
    fn test_decimal_fallback() {
        assert_eq!(parse_pointer("address 123456 bytes"), Some(123456));
        assert_eq!(parse_pointer("no digits"), None);
    }

    #[test]
    fn test_overflow_yields_none() {
        assert_eq!(parse_pointer("0x1ffffffffffffffff"), None);
        assert_eq!(parse_pointer("99999999999999999999999"), None);
    }

    #[test]
    fn test_classify_markers() {
        assert_eq!(classify_expression("{<disposed>}"), ExpressionValue::Disposed);
        assert_eq!(classify_expression("Mat (已释放)"), ExpressionValue::Disposed);
        assert_eq!(classify_expression(""), ExpressionValue::Unavailable);
        assert_eq!(classify_expression("null"), ExpressionValue::Unavailable);
        assert_eq!(
            classify_expression("<Unable to read memory>"),
            ExpressionValue::Unavailable
        );
        assert_eq!(classify_expression("<undefined>"), ExpressionValue::Unavailable);
    }

    #[test]
    fn test_classify_address() {
        assert_eq!(
            classify_expression(" 0x2000 "),
            ExpressionValue::Address(0x2000)
        );
        assert_eq!(classify_expression("garbage"), ExpressionValue::Unavailable);
    }
}
