//! CURP (Clave Única de Registro de Población) format checks.

use std::sync::LazyLock;

use regex::Regex;

/// 4 letters, birth date, sex, state, 3 internal consonants, homonym
/// differentiator and check digit.
static CURP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Z][AEIOUX][A-Z]{2}\d{2}(0[1-9]|1[0-2])(0[1-9]|[12]\d|3[01])[HMX](AS|BC|BS|CC|CL|CM|CS|CH|DF|DG|GT|GR|HG|JC|MC|MN|MS|NT|NL|OC|PL|QT|QR|SP|SL|SR|TC|TS|TL|VZ|YN|ZS|NE)[B-DF-HJ-NP-TV-Z]{3}[A-Z\d]\d$",
    )
    .expect("Invalid CURP regex")
});

/// Placeholder CURPs issued to foreigners without a personal one.
pub const GENERIC_CURPS: &[&str] = &["XEXX010101HNEXXXA4", "XEXX010101MNEXXXA8"];

const CHECK_ALPHABET: &str = "0123456789ABCDEFGHIJKLMNÑOPQRSTUVWXYZ";

/// Expected check digit for the first 17 characters.
fn check_digit(curp: &str) -> Option<u32> {
    let mut sum = 0u32;
    for (idx, ch) in curp.chars().take(17).enumerate() {
        let value = CHECK_ALPHABET.chars().position(|c| c == ch)?;
        sum += u32::try_from(value).ok()? * (18 - u32::try_from(idx).ok()?);
    }
    Some((10 - sum % 10) % 10)
}

pub fn is_generic_curp(value: &str) -> bool {
    let value = value.trim().to_uppercase();
    GENERIC_CURPS.contains(&value.as_str())
}

/// Structure and check digit. Generic placeholders are accepted.
pub fn is_valid_curp(value: &str) -> bool {
    let curp = value.trim().to_uppercase();
    if GENERIC_CURPS.contains(&curp.as_str()) {
        return true;
    }
    if !CURP_REGEX.is_match(&curp) {
        return false;
    }
    let declared = curp.chars().last().and_then(|c| c.to_digit(10));
    declared.is_some() && declared == check_digit(&curp)
}
