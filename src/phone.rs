//! Phone number mask for the `+7 (XXX) XXX-XX-XX` format.

/// Digits kept from the raw input.
pub const MAX_DIGITS: usize = 11;

/// Count the ASCII digits in a phone string.
pub fn digit_count(raw: &str) -> usize {
    raw.chars().filter(char::is_ascii_digit).count()
}

/// Render raw input as a (possibly partial) canonical phone number.
///
/// Non-digits are dropped, the digit run is capped at 11 and a leading `8`
/// becomes `7`. Separators only appear once a digit follows them, so the
/// output can be fed back in and edited with backspace.
pub fn format_phone(raw: &str) -> String {
    let mut digits: Vec<char> = raw
        .chars()
        .filter(char::is_ascii_digit)
        .take(MAX_DIGITS)
        .collect();
    if digits.is_empty() {
        return String::new();
    }
    if digits[0] == '8' {
        digits[0] = '7';
    }

    let n = digits.len();
    let span = |from: usize, to: usize| -> String { digits[from..to.min(n)].iter().collect() };

    let mut out = format!("+{}", digits[0]);
    if n > 1 {
        out.push_str(" (");
        out.push_str(&span(1, 4));
    }
    if n > 4 {
        out.push_str(") ");
        out.push_str(&span(4, 7));
    }
    if n > 7 {
        out.push('-');
        out.push_str(&span(7, 9));
    }
    if n > 9 {
        out.push('-');
        out.push_str(&span(9, 11));
    }
    out
}
