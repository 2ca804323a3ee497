//! Secure Messaging (ICAO 9303-11 §9.8): encrypt-then-MAC wrapping of every
//! APDU exchanged after access control, keyed by a pair of session keys and
//! ordered by a monotonically incrementing Send-Sequence-Counter.

use {
    crate::{
        crypto::{
            cipher::{pad, unpad, BlockCipher},
            kdf::SecurityConfiguration,
            mac::{aes_cmac, retail_mac},
        },
        error::{ErrorKind, Result},
        iso7816::{
            apdu::{append_lc, wrap_tlv},
            StatusWord,
        },
    },
    subtle::ConstantTimeEq,
    zeroize::{Zeroize, ZeroizeOnDrop},
};

/// The session key pair and Send-Sequence-Counter for one secure channel.
/// Replaced, never mutated in place, on every re-key (PACE success, CA
/// success); `Drop` zeroizes the key material.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionKeys {
    #[zeroize(skip)]
    config: SecurityConfiguration,
    ks_enc: Vec<u8>,
    ks_mac: Vec<u8>,
    ssc:    Vec<u8>,
}

impl SessionKeys {
    /// Builds a fresh channel. `ssc` must be exactly one block wide (8 bytes
    /// for 3DES, 16 for AES) per ICAO 9303-11 §9.8.3.1.
    #[must_use]
    pub fn new(config: SecurityConfiguration, ks_enc: Vec<u8>, ks_mac: Vec<u8>, ssc: Vec<u8>) -> Self {
        debug_assert_eq!(ssc.len(), config.block_cipher().block_size());
        Self {
            config,
            ks_enc,
            ks_mac,
            ssc,
        }
    }

    /// Zero-SSC channel, used after PACE and Chip Authentication (spec
    /// §4.3, §4.5 step 7, §4.6 step 4).
    #[must_use]
    pub fn new_zero_ssc(config: SecurityConfiguration, ks_enc: Vec<u8>, ks_mac: Vec<u8>) -> Self {
        Self::new(config, ks_enc, ks_mac, vec![0u8; config.block_cipher().block_size()])
    }

    fn increment_ssc(&mut self) {
        for byte in self.ssc.iter_mut().rev() {
            *byte = byte.wrapping_add(1);
            if *byte != 0 {
                break;
            }
        }
    }

    /// `E(KSenc, SSC)` for AES, all-zero for 3DES, per spec §4.3 step 3.
    fn iv(&self) -> Result<Vec<u8>> {
        let cipher = self.config.block_cipher();
        if matches!(self.config, SecurityConfiguration::Tdes) {
            Ok(vec![0u8; cipher.block_size()])
        } else {
            cipher.ecb_encrypt_block(&self.ks_enc, &self.ssc)
        }
    }

    fn mac(&self, data: &[u8]) -> Result<[u8; 8]> {
        let padded = pad(data, self.config.block_cipher().block_size());
        Ok(match self.config {
            SecurityConfiguration::Tdes => retail_mac(&self.ks_mac, &padded)?,
            _ => {
                let tag = aes_cmac(&self.ks_mac, &padded)?;
                let mut truncated = [0u8; 8];
                truncated.copy_from_slice(&tag[..8]);
                truncated
            }
        })
    }
}

/// A single BER-TLV data object scanned from a Secure Messaging payload:
/// one-byte tags (`87`, `97`, `99`, `8E`) with short or long form length,
/// per spec §4.3. Also reused by PACE and Chip Authentication to scan
/// `GENERAL AUTHENTICATE` dynamic authentication data.
pub(crate) fn read_tlvs(mut buf: &[u8]) -> Result<Vec<(u8, Vec<u8>)>> {
    let mut objects = Vec::new();
    while !buf.is_empty() {
        let tag = buf[0];
        buf = &buf[1..];
        let (len, rest) = read_ber_length(buf)?;
        if rest.len() < len {
            return Err(ErrorKind::TruncatedField.into());
        }
        let (value, rest) = rest.split_at(len);
        objects.push((tag, value.to_vec()));
        buf = rest;
    }
    Ok(objects)
}

fn read_ber_length(buf: &[u8]) -> Result<(usize, &[u8])> {
    let first = *buf.first().ok_or(ErrorKind::TruncatedField)?;
    if first < 0x80 {
        return Ok((first as usize, &buf[1..]));
    }
    let count = (first & 0x7f) as usize;
    if count == 0 || count > 4 || buf.len() < 1 + count {
        return Err(ErrorKind::TruncatedField.into());
    }
    let mut len = 0usize;
    for &b in &buf[1..1 + count] {
        len = (len << 8) | b as usize;
    }
    Ok((len, &buf[1 + count..]))
}

pub(crate) fn find_tlv(objects: &[(u8, Vec<u8>)], tag: u8) -> Option<&[u8]> {
    objects
        .iter()
        .find_map(|(t, v)| (*t == tag).then_some(v.as_slice()))
}

impl SessionKeys {
    /// Wraps a plaintext command APDU (built via [`crate::iso7816::apdu`])
    /// into its Secure Messaging form, per spec §4.3 steps 1-9.
    pub fn protect(&mut self, command: &[u8]) -> Result<Vec<u8>> {
        self.increment_ssc();
        let block_size = self.config.block_cipher().block_size();
        let cipher = self.config.block_cipher();
        let apdu = crate::iso7816::parse_apdu(command).map_err(|_| ErrorKind::TruncatedField)?;

        let masked_header = pad(&[0x0C, apdu.ins(), apdu.p1(), apdu.p2()], block_size);

        let mut body = Vec::new();
        if !apdu.data.is_empty() {
            let iv = self.iv()?;
            let ciphertext = cipher.cbc_encrypt(&self.ks_enc, &iv, &pad(apdu.data, block_size))?;
            let mut do87_value = vec![0x01];
            do87_value.extend_from_slice(&ciphertext);
            body.extend_from_slice(&wrap_tlv(0x87, &do87_value));
        }
        if !apdu.le.is_empty() {
            body.extend_from_slice(&wrap_tlv(0x97, apdu.le));
        }

        let mut m = masked_header;
        m.extend_from_slice(&body);

        let mut n = self.ssc.clone();
        n.extend_from_slice(&m);
        let cc = self.mac(&n)?;
        body.extend_from_slice(&wrap_tlv(0x8E, &cc));

        let mut protected = vec![0x0C, apdu.ins(), apdu.p1(), apdu.p2()];
        append_lc(&mut protected, &body);
        protected.extend_from_slice(&body);
        if !apdu.le.is_empty() {
            protected.push(0x00);
        }
        Ok(protected)
    }

    /// Unwraps a protected response into its plaintext data and status
    /// word, per spec §4.3 steps 1-6. `response` is the raw data field of
    /// the card's reply (not including SW1/SW2); `sw` is the parsed status
    /// word. If `sw` is not `9000`, the response is returned unparsed (a
    /// transport-level or unprotected error response).
    pub fn unprotect(&mut self, response: &[u8], sw: StatusWord) -> Result<(Vec<u8>, StatusWord)> {
        self.increment_ssc();
        if sw != StatusWord::SUCCESS {
            return Ok((response.to_vec(), sw));
        }

        let objects = read_tlvs(response)?;
        let do87 = find_tlv(&objects, 0x87);
        let do99 = find_tlv(&objects, 0x99).ok_or(ErrorKind::InvalidChecksum)?;
        let do8e = find_tlv(&objects, 0x8E).ok_or(ErrorKind::InvalidChecksum)?;

        let mut n = self.ssc.clone();
        if let Some(do87) = do87 {
            n.extend_from_slice(&wrap_tlv(0x87, do87));
        }
        n.extend_from_slice(&wrap_tlv(0x99, do99));
        let expected_cc = self.mac(&n)?;
        let do8e_arr: [u8; 8] = do8e.try_into().map_err(|_| ErrorKind::InvalidChecksum)?;
        if expected_cc.ct_ne(&do8e_arr).into() {
            return Err(ErrorKind::InvalidChecksum.into());
        }

        let plaintext = match do87 {
            Some(do87) => {
                let (marker, ciphertext) = do87.split_first().ok_or(ErrorKind::InvalidChecksum)?;
                if *marker != 0x01 {
                    return Err(ErrorKind::InvalidChecksum.into());
                }
                let iv = self.iv()?;
                let padded = self.config.block_cipher().cbc_decrypt(&self.ks_enc, &iv, ciphertext)?;
                unpad(&padded)
            }
            None => Vec::new(),
        };

        if do99.len() != 2 {
            return Err(ErrorKind::InvalidChecksum.into());
        }
        let reply_sw = StatusWord::from(u16::from_be_bytes([do99[0], do99[1]]));
        Ok((plaintext, reply_sw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_keys() -> SessionKeys {
        // ICAO 9303-11 Appendix D.4 worked example key set.
        SessionKeys::new(
            SecurityConfiguration::Tdes,
            hex::decode("979EC13B1CBFE9DCD01AB0FED307EAE5").unwrap()[..16].to_vec(),
            hex::decode("F1CB1F1FB5ADF208806B89DC579DC1F8").unwrap()[..16].to_vec(),
            hex::decode("887022120C06C226").unwrap(),
        )
    }

    #[test]
    fn protect_then_unprotect_recovers_plaintext_and_advances_ssc_by_two() {
        let mut keys = test_keys();
        let initial_ssc = keys.ssc.clone();
        let command = crate::iso7816::apdu::select_ef(crate::iso7816::apdu::EF_CARD_ACCESS);
        let _protected = keys.protect(&command).unwrap();

        // Build a fake protected response the way a chip would, at the SSC
        // value `unprotect`'s own increment will reach.
        let mut responder = SessionKeys::new(keys.config, keys.ks_enc.clone(), keys.ks_mac.clone(), keys.ssc.clone());
        responder.increment_ssc();
        let plaintext = b"0110090001010100".to_vec();
        let iv = responder.iv().unwrap();
        let ciphertext = BlockCipher::Tdes
            .cbc_encrypt(&responder.ks_enc, &iv, &pad(&plaintext, 8))
            .unwrap();
        let mut do87_value = vec![0x01];
        do87_value.extend_from_slice(&ciphertext);
        let do87 = wrap_tlv(0x87, &do87_value);
        let do99 = wrap_tlv(0x99, &[0x90, 0x00]);
        let mut n = responder.ssc.clone();
        n.extend_from_slice(&do87);
        n.extend_from_slice(&do99);
        let cc = responder.mac(&n).unwrap();
        let do8e = wrap_tlv(0x8E, &cc);
        let mut response = do87;
        response.extend_from_slice(&do99);
        response.extend_from_slice(&do8e);

        let (recovered, sw) = keys.unprotect(&response, StatusWord::SUCCESS).unwrap();
        assert_eq!(recovered, plaintext);
        assert_eq!(sw, StatusWord::SUCCESS);
        assert_eq!(keys.ssc, responder.ssc);
        assert_ne!(keys.ssc, initial_ssc);
    }

    #[test]
    fn ssc_increments_big_endian_with_carry() {
        let mut keys = test_keys();
        keys.ssc = vec![0x00, 0x00, 0x00, 0xFF];
        keys.increment_ssc();
        assert_eq!(keys.ssc, vec![0x00, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn mse_select_matches_icao_worked_example() {
        // ICAO 9303-11 Appendix D.4: SSC starts at 887022120C06C226, is
        // incremented to 887022120C06C227 before protecting the MSE SELECT
        // APDU `00 A4 02 0C 02 01 1E`.
        let mut keys = test_keys();
        let command = [0x00, 0xA4, 0x02, 0x0C, 0x02, 0x01, 0x1E];
        let protected = keys.protect(&command).unwrap();
        assert_eq!(keys.ssc, hex::decode("887022120C06C227").unwrap());
        assert_eq!(protected[0], 0x0C);
        assert_eq!(protected[4] as usize, protected.len() - 5); // short-form Lc
        assert_eq!(protected[5], 0x87); // DO'87' tag starts the body
    }
}
