//! Validators for user-typed leaf values.
//!
//! Both predicates work on raw text as typed in an inline editor, so escape
//! sequences appear literally (a backslash followed by `n`, not a newline).

use serde_json::Number;

/// Check that `s` is safe to embed between JSON double quotes.
///
/// A backslash must start one of the escapes `\"`, `\\`, `\/`, `\b`, `\f`,
/// `\n`, `\r`, `\t` or `\uXXXX` (exactly four hex digits). A bare double
/// quote is never allowed. The empty string is valid.
///
/// # Example
///
/// ```
/// use leafit::is_valid_string;
///
/// assert!(is_valid_string("unescaped / solidus"));
/// assert!(is_valid_string(r"escaped \n newline"));
/// assert!(is_valid_string(r"unicode \u1234"));
/// assert!(!is_valid_string(r"unterminatedKey \u12"));
/// assert!(!is_valid_string(r#"bare " quote"#));
/// ```
pub fn is_valid_string(s: &str) -> bool {
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '"' => return false,
            '\\' => match chars.next() {
                Some('"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't') => {}
                Some('u') => {
                    for _ in 0..4 {
                        if !chars.next().is_some_and(|c| c.is_ascii_hexdigit()) {
                            return false;
                        }
                    }
                }
                _ => return false,
            },
            _ => {}
        }
    }
    true
}

/// Check that `s` is a number literal in canonical JSON shape.
///
/// Grammar: `-?[0-9]+(\.[0-9]*)?([eE][+-][0-9]+)?`. The exponent sign is
/// mandatory and a trailing dot is accepted.
///
/// # Example
///
/// ```
/// use leafit::is_valid_number;
///
/// assert!(is_valid_number("0."));
/// assert!(is_valid_number("10e+2"));
/// assert!(!is_valid_number(".5"));
/// assert!(!is_valid_number("10e5"));
/// assert!(!is_valid_number("NaN"));
/// ```
pub fn is_valid_number(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;

    if bytes.first() == Some(&b'-') {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == int_start {
        return false;
    }

    if bytes.get(i) == Some(&b'.') {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if !matches!(bytes.get(i), Some(b'+' | b'-')) {
            return false;
        }
        i += 1;
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

/// Parse text accepted by [`is_valid_number`] into a JSON number.
///
/// Leading zeros and a dangling dot are normalized away first. Returns `None`
/// for invalid text and for magnitudes outside the `f64` range.
pub fn parse_number(s: &str) -> Option<Number> {
    if !is_valid_number(s) {
        return None;
    }

    let (sign, unsigned) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s),
    };
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(idx) => unsigned.split_at(idx),
        None => (unsigned, ""),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (mantissa, ""),
    };
    let int_part = int_part.trim_start_matches('0');
    let int_part = if int_part.is_empty() { "0" } else { int_part };

    let mut canonical = String::with_capacity(s.len() + 1);
    canonical.push_str(sign);
    canonical.push_str(int_part);
    if !frac_part.is_empty() {
        canonical.push('.');
        canonical.push_str(frac_part);
    }
    canonical.push_str(exponent);

    canonical.parse::<Number>().ok()
}
