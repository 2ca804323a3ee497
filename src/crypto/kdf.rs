//! The key derivation function shared by BAC, PACE and Chip Authentication,
//! per ICAO 9303-11 §9.7.1: `K = H(K_seed || c)` where `c` selects the key's
//! purpose, truncated/parity-adjusted per the negotiated cipher.

use {
    super::cipher::BlockCipher,
    crate::error::{ErrorKind, Result},
    sha1::Sha1,
    sha2::{Digest, Sha256},
};

/// Counter values appended to the seed before hashing, per §9.7.1.
const ENC_MODE: u32 = 1;
const MAC_MODE: u32 = 2;
const PACE_MODE: u32 = 3;

/// The negotiated cipher/key-length pair for a secure channel, per spec §3
/// "Security configuration". Distinct from [`BlockCipher`], which is purely
/// about the cipher's block operation; this additionally pins the session
/// key length and the KDF's hash function.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SecurityConfiguration {
    Tdes,
    Aes128,
    Aes192,
    Aes256,
}

impl SecurityConfiguration {
    /// The block cipher used for encryption and IV derivation.
    #[must_use]
    pub const fn block_cipher(self) -> BlockCipher {
        match self {
            Self::Tdes => BlockCipher::Tdes,
            Self::Aes128 => BlockCipher::Aes128,
            Self::Aes192 => BlockCipher::Aes192,
            Self::Aes256 => BlockCipher::Aes256,
        }
    }

    /// Session key length in bytes, after KDF truncation.
    #[must_use]
    pub const fn key_len(self) -> usize {
        match self {
            Self::Tdes => 16,
            Self::Aes128 => 16,
            Self::Aes192 => 24,
            Self::Aes256 => 32,
        }
    }

    /// MAC tag length used on the wire: 8 bytes for Retail MAC, truncated
    /// AES-CMAC for AES, per spec §4.3.
    #[must_use]
    pub const fn mac_len(self) -> usize {
        8
    }

    /// The hash function the KDF uses: SHA-1 for 3DES and AES-128, SHA-256
    /// for AES-192/256, per ICAO 9303-11 §9.7.1.
    fn kdf_hash(self, seed: &[u8]) -> Vec<u8> {
        match self {
            Self::Tdes | Self::Aes128 => Sha1::digest(seed).to_vec(),
            Self::Aes192 | Self::Aes256 => Sha256::digest(seed).to_vec(),
        }
    }

    /// Derives a key of purpose `mode` from `key_seed` (and, for PACE
    /// round 2, additionally folding in the shared secret). The digest is
    /// truncated to [`Self::key_len`] bytes; 3DES keys additionally get
    /// DES odd-parity adjustment per §9.7.1.
    fn derive(self, key_seed: &[u8], mode: u32) -> Vec<u8> {
        let mut input = key_seed.to_vec();
        input.extend_from_slice(&mode.to_be_bytes());
        let digest = self.kdf_hash(&input);
        let mut key = digest[..self.key_len()].to_vec();
        if matches!(self, Self::Tdes) {
            set_des_parity(&mut key);
        }
        key
    }

    /// Derives the pair of static BAC/PACE-round-2 session keys `(KSenc,
    /// KSmac)` from a key seed, per ICAO 9303-11 §9.7.1.
    #[must_use]
    pub fn derive_session_keys(self, key_seed: &[u8]) -> (Vec<u8>, Vec<u8>) {
        (
            self.derive(key_seed, ENC_MODE),
            self.derive(key_seed, MAC_MODE),
        )
    }

    /// Derives the PACE round-1 mapping key `K_pi` from the MRZ-derived
    /// seed, per ICAO 9303-11 §9.7.1 / spec §4.5 step 1.
    #[must_use]
    pub fn derive_pace_mapping_key(self, key_seed: &[u8]) -> Vec<u8> {
        self.derive(key_seed, PACE_MODE)
    }
}

impl TryFrom<&str> for SecurityConfiguration {
    type Error = crate::error::Error;

    /// Parses the symmetric cipher arc of a PACE/CA OID's trailing
    /// component (`"3des"`, `"aes128"`, `"aes192"`, `"aes256"`), matching
    /// the naming already used by [`crate::asn1::emrtd::security_info`].
    fn try_from(name: &str) -> Result<Self> {
        match name {
            "3des" | "tdes" => Ok(Self::Tdes),
            "aes128" => Ok(Self::Aes128),
            "aes192" => Ok(Self::Aes192),
            "aes256" => Ok(Self::Aes256),
            _ => Err(ErrorKind::UnknownSecurityConfiguration.into()),
        }
    }
}

/// Adjusts each byte of a DES key so each byte has odd parity (the low bit
/// set iff the remaining 7 bits have an even number of set bits), as
/// required by ICAO 9303-11 §9.7.1 for 3DES keys derived via the KDF.
fn set_des_parity(key: &mut [u8]) {
    for byte in key.iter_mut() {
        let parity = (*byte & 0xFE).count_ones() % 2;
        *byte = (*byte & 0xFE) | u8::from(parity == 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// ICAO 9303-11 §D.1 worked BAC example: `K_seed` from the MRZ key,
    /// expected `K_ENC`/`K_MAC`.
    #[test]
    fn bac_kdf_worked_example() {
        let key_seed = hex::decode("239AB9CB282DAF66231DC5A4DF6BFBAE").unwrap();
        let (kenc, kmac) = SecurityConfiguration::Tdes.derive_session_keys(&key_seed);
        assert_eq!(hex::encode(&kenc), "ab94fdecf2674fdfb9b391f85d7f76f2");
        assert_eq!(hex::encode(&kmac), "7962d9ece03d1acd4c76089dce131543");
    }

    #[test]
    fn des_parity_sets_odd_parity_on_every_byte() {
        let mut key = vec![0x00u8, 0xFFu8];
        set_des_parity(&mut key);
        for byte in key {
            assert_eq!(byte.count_ones() % 2, 1);
        }
    }

    #[test]
    fn aes256_uses_sha256_and_32_byte_keys() {
        let key_seed = [0x11u8; 32];
        let (kenc, kmac) = SecurityConfiguration::Aes256.derive_session_keys(&key_seed);
        assert_eq!(kenc.len(), 32);
        assert_eq!(kmac.len(), 32);
        assert_ne!(kenc, kmac);
    }
}
