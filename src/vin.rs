//! VIN normalization and format checks.

/// Length of a complete VIN.
pub const VIN_LEN: usize = 17;

/// Result of checking a VIN as typed on the form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VinCheck {
    /// Uppercased input.
    pub normalized: String,
    /// Empty, or 17 characters from the VIN alphabet.
    pub is_format_valid: bool,
    /// Exactly 17 characters long.
    pub is_complete: bool,
}

impl VinCheck {
    /// Helper line shown under the VIN field.
    pub fn hint(&self) -> String {
        let len = self.normalized.chars().count();
        if len == 0 {
            "17 characters, latin letters and digits".into()
        } else if !self.is_complete {
            format!("{} chars left to a full VIN", VIN_LEN.saturating_sub(len))
        } else if self.is_format_valid {
            "VIN format is valid".into()
        } else {
            "Invalid characters (no I, O, Q)".into()
        }
    }
}

/// Letters I, O and Q are excluded from VINs.
fn is_vin_char(c: char) -> bool {
    c.is_ascii_digit() || (c.is_ascii_uppercase() && !matches!(c, 'I' | 'O' | 'Q'))
}

pub fn check_vin(raw: &str) -> VinCheck {
    let normalized = raw.to_uppercase();
    let len = normalized.chars().count();
    let is_format_valid = len == 0 || (len == VIN_LEN && normalized.chars().all(is_vin_char));
    VinCheck {
        normalized,
        is_format_valid,
        is_complete: len == VIN_LEN,
    }
}

/// Input mask: uppercase and cap at 17 characters.
pub fn mask(raw: &str) -> String {
    raw.to_uppercase().chars().take(VIN_LEN).collect()
}
