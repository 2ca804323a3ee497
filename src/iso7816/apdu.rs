//! Command APDU builders for the catalogue in spec §6, plus BER-TLV data
//! object helpers (`DO'xx'`) used by Secure Messaging, BAC, PACE and Chip
//! Authentication.

/// AID of the eMRTD application, per ICAO 9303-4.
pub const EMRTD_AID: [u8; 7] = [0xA0, 0x00, 0x00, 0x02, 0x47, 0x10, 0x01];

/// `01 1C`, the short EF id of `EF.CardAccess`.
pub const EF_CARD_ACCESS: [u8; 2] = [0x01, 0x1C];

/// Builds `SELECT master file`.
#[must_use]
pub fn select_master_file() -> Vec<u8> {
    vec![0x00, 0xA4, 0x00, 0x0C, 0x02, 0x3F, 0x00]
}

/// Builds `SELECT AID` for the eMRTD application.
#[must_use]
pub fn select_aid(aid: &[u8]) -> Vec<u8> {
    let mut apdu = vec![0x00, 0xA4, 0x04, 0x0C, aid.len() as u8];
    apdu.extend_from_slice(aid);
    apdu
}

/// Builds `SELECT EF` for the given 2-byte short EF identifier.
#[must_use]
pub fn select_ef(file_id: [u8; 2]) -> Vec<u8> {
    vec![0x00, 0xA4, 0x02, 0x0C, 0x02, file_id[0], file_id[1]]
}

/// Builds `READ BINARY` reading up to `len` bytes at `offset`. `offset`
/// must fit in 15 bits (the high bit of P1 is reserved, per ISO 7816-4).
#[must_use]
pub fn read_binary(offset: u16, len: u8) -> Vec<u8> {
    let [hi, lo] = offset.to_be_bytes();
    vec![0x00, 0xB0, hi, lo, len]
}

/// Builds `GET CHALLENGE`, requesting an 8-byte `RND.IC`.
#[must_use]
pub fn get_challenge() -> Vec<u8> {
    vec![0x00, 0x84, 0x00, 0x00, 0x08]
}

/// Builds `EXTERNAL AUTHENTICATE` carrying `E_IFD ‖ M_IFD` (40 bytes),
/// expecting a 40-byte response.
#[must_use]
pub fn external_authenticate(data: &[u8]) -> Vec<u8> {
    let mut apdu = vec![0x00, 0x82, 0x00, 0x00, data.len() as u8];
    apdu.extend_from_slice(data);
    apdu.push(0x28); // Le = 40
    apdu
}

/// Builds `GENERAL AUTHENTICATE` wrapping `data` in the dynamic
/// authentication template (`7C`), expecting an extended-length response.
/// `chaining` selects CLA `0x10` (more data follows) vs `0x00` (final/only
/// chunk), per spec §4.5/§4.6.
#[must_use]
pub fn general_authenticate(data: &[u8], chaining: bool) -> Vec<u8> {
    let cla = if chaining { 0x10 } else { 0x00 };
    let body = wrap_tlv(0x7C, data);
    let mut apdu = vec![cla, 0x86, 0x00, 0x00];
    append_lc(&mut apdu, &body);
    apdu.extend_from_slice(&body);
    apdu.push(0x00); // Le = 0 (extended, if Lc was extended)
    apdu
}

/// Builds `MSE:Set AT` for mutual authentication (PACE), P1=`C1`, P2=`A4`.
#[must_use]
pub fn mse_set_at_pace(data: &[u8]) -> Vec<u8> {
    let mut apdu = vec![0x00, 0x22, 0xC1, 0xA4];
    append_lc(&mut apdu, data);
    apdu.extend_from_slice(data);
    apdu
}

/// Builds `MSE:Set AT` for Chip Authentication's AES path, P1=`41`, P2=`A6`.
#[must_use]
pub fn mse_set_at_ca(data: &[u8]) -> Vec<u8> {
    let mut apdu = vec![0x00, 0x22, 0x41, 0xA6];
    append_lc(&mut apdu, data);
    apdu.extend_from_slice(data);
    apdu
}

/// Builds `MSE:Set KAT` for Chip Authentication's 3DES path, P1=`41`,
/// P2=`A6`.
#[must_use]
pub fn mse_set_kat(data: &[u8]) -> Vec<u8> {
    let mut apdu = vec![0x00, 0x22, 0x41, 0xA6];
    append_lc(&mut apdu, data);
    apdu.extend_from_slice(data);
    apdu
}

/// Appends an Lc field (short form if `data.len() <= 255`, else extended
/// form `00 hi lo`).
pub(crate) fn append_lc(apdu: &mut Vec<u8>, data: &[u8]) {
    if data.len() <= 255 {
        apdu.push(data.len() as u8);
    } else {
        apdu.push(0x00);
        apdu.extend_from_slice(&(data.len() as u16).to_be_bytes());
    }
}

/// Wraps `value` as a BER-TLV data object with tag `tag` (single-byte tag
/// only; the tags this crate needs — `7C`, `80`..`99` — are all one byte).
#[must_use]
pub fn wrap_tlv(tag: u8, value: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    encode_ber_length(&mut out, value.len());
    out.extend_from_slice(value);
    out
}

/// Encodes a BER length: short form below 128, else long form with a
/// minimal big-endian byte count.
pub fn encode_ber_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let be = len.to_be_bytes();
        let trim = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
        let trimmed = &be[trim..];
        out.push(0x80 | trimmed.len() as u8);
        out.extend_from_slice(trimmed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_master_file_matches_catalogue() {
        assert_eq!(select_master_file(), [0x00, 0xA4, 0x00, 0x0C, 0x02, 0x3F, 0x00]);
    }

    #[test]
    fn select_ef_encodes_file_id() {
        assert_eq!(select_ef(EF_CARD_ACCESS), [0x00, 0xA4, 0x02, 0x0C, 0x02, 0x01, 0x1C]);
    }

    #[test]
    fn get_challenge_matches_catalogue() {
        assert_eq!(get_challenge(), [0x00, 0x84, 0x00, 0x00, 0x08]);
    }

    #[test]
    fn wrap_tlv_uses_short_form_below_128() {
        let tlv = wrap_tlv(0x80, &[0x01, 0x02]);
        assert_eq!(tlv, [0x80, 0x02, 0x01, 0x02]);
    }

    #[test]
    fn wrap_tlv_uses_long_form_at_and_above_128() {
        let value = vec![0u8; 128];
        let tlv = wrap_tlv(0x80, &value);
        assert_eq!(&tlv[..3], [0x80, 0x81, 0x80]);
        assert_eq!(tlv.len(), 3 + 128);
    }

    #[test]
    fn general_authenticate_sets_chaining_class_byte() {
        let chained = general_authenticate(&[0xAA; 10], true);
        assert_eq!(chained[0], 0x10);
        let final_chunk = general_authenticate(&[0xAA; 10], false);
        assert_eq!(final_chunk[0], 0x00);
    }
}
