//! Message authentication codes used by Secure Messaging, BAC and PACE:
//! Retail MAC (ISO 9797-1 MAC algorithm 3, built on single-DES) for 3DES
//! sessions, and AES-CMAC for AES sessions.

use {
    crate::error::{ErrorKind, Result},
    aes::{Aes128, Aes192, Aes256},
    cipher::{BlockDecrypt, BlockEncrypt, KeyInit},
    cmac::{Cmac, Mac},
    des::Des,
};

/// Computes Retail MAC (ISO/IEC 9797-1 MAC algorithm 3) over `data`, which
/// must already be padded to a multiple of 8 bytes (see
/// [`super::cipher::pad`]). `key` is the 16-byte 3DES-EDE2 key `K1 || K2`.
///
/// The algorithm: CBC-MAC the data under single-DES with `K1`, then apply
/// one extra DES-EDE2 round (decrypt with `K2`, encrypt with `K1`) to the
/// final block.
pub fn retail_mac(key: &[u8], data: &[u8]) -> Result<[u8; 8]> {
    if key.len() != 16 {
        return Err(ErrorKind::InvalidInput("Retail MAC key must be 16 bytes").into());
    }
    if data.is_empty() || data.len() % 8 != 0 {
        return Err(ErrorKind::InvalidInput("Retail MAC input must be a non-empty multiple of 8 bytes").into());
    }
    let k1 = Des::new_from_slice(&key[..8]).map_err(|_| ErrorKind::InvalidInput("invalid K1"))?;
    let k2 = Des::new_from_slice(&key[8..]).map_err(|_| ErrorKind::InvalidInput("invalid K2"))?;

    let mut block = [0u8; 8];
    for chunk in data.chunks_exact(8) {
        for i in 0..8 {
            block[i] ^= chunk[i];
        }
        let mut generic = block.into();
        k1.encrypt_block(&mut generic);
        block = generic.into();
    }

    let mut generic = block.into();
    k2.decrypt_block(&mut generic);
    k1.encrypt_block(&mut generic);
    Ok(generic.into())
}

/// The AES-CMAC variant, dispatched on key size.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AesCmacKeySize {
    Aes128,
    Aes192,
    Aes256,
}

/// Computes AES-CMAC (RFC 4493, generalized to AES-192/256 keys) over
/// `data`. Returns the full 16-byte tag; Secure Messaging truncates to 8
/// bytes per spec §4.3.
pub fn aes_cmac(key: &[u8], data: &[u8]) -> Result<[u8; 16]> {
    let tag = match key.len() {
        16 => {
            let mut mac = Cmac::<Aes128>::new_from_slice(key)
                .map_err(|_| ErrorKind::InvalidInput("invalid AES-128 CMAC key"))?;
            mac.update(data);
            mac.finalize().into_bytes()
        }
        24 => {
            let mut mac = Cmac::<Aes192>::new_from_slice(key)
                .map_err(|_| ErrorKind::InvalidInput("invalid AES-192 CMAC key"))?;
            mac.update(data);
            mac.finalize().into_bytes()
        }
        32 => {
            let mut mac = Cmac::<Aes256>::new_from_slice(key)
                .map_err(|_| ErrorKind::InvalidInput("invalid AES-256 CMAC key"))?;
            mac.update(data);
            mac.finalize().into_bytes()
        }
        _ => return Err(ErrorKind::InvalidInput("unsupported AES-CMAC key length").into()),
    };
    let mut out = [0u8; 16];
    out.copy_from_slice(&tag);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retail_mac_is_deterministic_and_block_sized() {
        let key = [0x5Au8; 16];
        let data = super::super::cipher::pad(b"mutual authenticate", 8);
        let mac1 = retail_mac(&key, &data).unwrap();
        let mac2 = retail_mac(&key, &data).unwrap();
        assert_eq!(mac1, mac2);
    }

    #[test]
    fn retail_mac_rejects_non_block_aligned_input() {
        let key = [0x5Au8; 16];
        assert!(retail_mac(&key, b"not8").is_err());
    }

    #[test]
    fn retail_mac_icao_worked_example() {
        // ICAO 9303-11 Appendix D.4's own worked Retail MAC example.
        let key = hex::decode("7962D9ECE03D1ACD4C76089DCE131543").unwrap();
        let data = hex::decode("887022120C06C226").unwrap();
        let mac = retail_mac(&key, &data).unwrap();
        assert_eq!(hex::encode_upper(mac), "5F1448EEA8AD90A7");
    }

    #[test]
    fn aes_cmac_rfc4493_subkey_zero_message_vector() {
        // RFC 4493 test vector #1: empty message under the all-16-byte key.
        let key = hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap();
        let mac = aes_cmac(&key, b"").unwrap();
        assert_eq!(hex::encode(mac), "bb1d6929e95937287fa37d129b756f18");
    }
}
