//! MRZ-key derivation (spec §6), out of scope as a feature but specified
//! for boundary completeness: BAC and PACE both need the 24-character
//! key derived from the document number, date of birth and date of
//! expiry printed in the Machine Readable Zone.

use crate::error::{ErrorKind, Result};

/// Computes the ICAO check digit over `field` using weights `7, 3, 1`
/// (cycling) and the character-value table: digits map to themselves,
/// `<` and space map to 0, `A..Z` map to `10..35`.
#[must_use]
pub fn check_digit(field: &str) -> u8 {
    const WEIGHTS: [u32; 3] = [7, 3, 1];
    let sum: u32 = field
        .bytes()
        .enumerate()
        .map(|(i, b)| char_value(b) * WEIGHTS[i % 3])
        .sum();
    (sum % 10) as u8
}

fn char_value(b: u8) -> u32 {
    match b {
        b'0'..=b'9' => u32::from(b - b'0'),
        b'A'..=b'Z' => u32::from(b - b'A') + 10,
        _ => 0, // '<' and space
    }
}

/// Pads `value` on the right with `<` to `len` characters.
fn pad(value: &str, len: usize) -> String {
    let mut padded = value.to_string();
    while padded.len() < len {
        padded.push('<');
    }
    padded
}

/// Derives the 24-character MRZ key (`docNo ‖ cd_doc ‖ dob ‖ cd_dob ‖ exp
/// ‖ cd_exp`) used to seed BAC and PACE, per spec §6.
///
/// `date_of_birth` and `date_of_expiry` must be exactly 6 digits in
/// `YYMMDD` form.
pub fn derive_mrz_key(
    document_number: &str,
    date_of_birth: &str,
    date_of_expiry: &str,
) -> Result<String> {
    if document_number.len() > 9 || !document_number.bytes().all(is_mrz_char) {
        return Err(ErrorKind::InvalidMrzKey.into());
    }
    if date_of_birth.len() != 6 || !date_of_birth.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ErrorKind::InvalidMrzKey.into());
    }
    if date_of_expiry.len() != 6 || !date_of_expiry.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ErrorKind::InvalidMrzKey.into());
    }

    let doc_no = pad(document_number, 9);
    let cd_doc = check_digit(&doc_no);
    let cd_dob = check_digit(date_of_birth);
    let cd_exp = check_digit(date_of_expiry);

    Ok(format!(
        "{doc_no}{cd_doc}{date_of_birth}{cd_dob}{date_of_expiry}{cd_exp}"
    ))
}

fn is_mrz_char(b: u8) -> bool {
    b.is_ascii_digit() || b.is_ascii_uppercase() || b == b'<'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_digit_of_all_filler_field_is_zero() {
        assert_eq!(check_digit("<<<<<<<<<"), 0);
    }

    #[test]
    fn icao_worked_example() {
        // ICAO 9303-11 Appendix D.2 worked example.
        let key = derive_mrz_key("L898902C", "690806", "940623").unwrap();
        assert_eq!(key, "L898902C<369080619406236");
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(derive_mrz_key("L898902C3", "69080A", "940623").is_err());
        assert!(derive_mrz_key("L898902C3", "690806", "94062").is_err());
    }

    #[test]
    fn rejects_oversized_document_number() {
        assert!(derive_mrz_key("TOOLONGDOCNUMBER", "690806", "940623").is_err());
    }
}
