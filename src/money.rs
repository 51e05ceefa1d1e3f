//! Number formatting for prices and factors.

/// Group thousands with spaces: `1234567` → `1 234 567`.
pub fn group_digits(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Price in rubles, e.g. `893 228 ₽`.
pub fn format_rub(amount: i64) -> String {
    format!("{} ₽", group_digits(amount))
}

/// Multiplier as shown in the breakdown, e.g. `× 0.95`.
pub fn format_factor(multiplier: f64) -> String {
    format!("× {multiplier:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(80_000), "80 000");
        assert_eq!(group_digits(1_500_000), "1 500 000");
        assert_eq!(group_digits(-12_345), "-12 345");
    }

    #[test]
    fn test_format_rub_and_factor() {
        assert_eq!(format_rub(893_228), "893 228 ₽");
        assert_eq!(format_factor(1.0), "× 1.00");
        assert_eq!(format_factor(1.12), "× 1.12");
    }
}
