//! Block ciphers and ISO/IEC 7816-4 padding, as used by Secure Messaging,
//! BAC, PACE and Chip Authentication (spec §4.2).
//!
//! 3DES runs in CBC mode with two-key (EDE2) keying; AES runs in CBC mode
//! with 128/192/256-bit keys. Both use "padding method 2": append `0x80`,
//! then zero bytes to the next block boundary.

use {
    crate::error::{ErrorKind, Result},
    aes::{Aes128, Aes192, Aes256},
    cbc::{Decryptor, Encryptor},
    cipher::{block_padding::NoPadding, BlockDecryptMut, BlockEncryptMut, KeyIvInit},
    des::TdesEde2,
};

/// The symmetric cipher negotiated for a secure channel, per spec §3
/// "Security configuration".
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BlockCipher {
    Tdes,
    Aes128,
    Aes192,
    Aes256,
}

impl BlockCipher {
    /// Block size in bytes: 8 for 3DES, 16 for AES.
    #[must_use]
    pub const fn block_size(self) -> usize {
        match self {
            Self::Tdes => 8,
            Self::Aes128 | Self::Aes192 | Self::Aes256 => 16,
        }
    }

    /// Key length in bytes this cipher expects.
    #[must_use]
    pub const fn key_len(self) -> usize {
        match self {
            Self::Tdes => 16,
            Self::Aes128 => 16,
            Self::Aes192 => 24,
            Self::Aes256 => 32,
        }
    }

    /// Encrypts `plaintext` (which must already be a multiple of the block
    /// size) under `key` in CBC mode with the given IV.
    pub fn cbc_encrypt(self, key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        if plaintext.len() % self.block_size() != 0 {
            return Err(ErrorKind::InvalidInput("plaintext is not block-aligned").into());
        }
        let mut buffer = plaintext.to_vec();
        match self {
            Self::Tdes => {
                let des_key = tdes_ede2_key(key)?;
                let enc = Encryptor::<TdesEde2>::new_from_slices(&des_key, iv)
                    .map_err(|_| ErrorKind::InvalidInput("invalid 3DES key/IV length"))?;
                encrypt_in_place(enc, &mut buffer)?;
            }
            Self::Aes128 => {
                let enc = Encryptor::<Aes128>::new_from_slices(key, iv)
                    .map_err(|_| ErrorKind::InvalidInput("invalid AES-128 key/IV length"))?;
                encrypt_in_place(enc, &mut buffer)?;
            }
            Self::Aes192 => {
                let enc = Encryptor::<Aes192>::new_from_slices(key, iv)
                    .map_err(|_| ErrorKind::InvalidInput("invalid AES-192 key/IV length"))?;
                encrypt_in_place(enc, &mut buffer)?;
            }
            Self::Aes256 => {
                let enc = Encryptor::<Aes256>::new_from_slices(key, iv)
                    .map_err(|_| ErrorKind::InvalidInput("invalid AES-256 key/IV length"))?;
                encrypt_in_place(enc, &mut buffer)?;
            }
        }
        Ok(buffer)
    }

    /// Decrypts `ciphertext` (a multiple of the block size) under `key` in
    /// CBC mode with the given IV.
    pub fn cbc_decrypt(self, key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() % self.block_size() != 0 {
            return Err(ErrorKind::InvalidInput("ciphertext is not block-aligned").into());
        }
        let mut buffer = ciphertext.to_vec();
        match self {
            Self::Tdes => {
                let des_key = tdes_ede2_key(key)?;
                let dec = Decryptor::<TdesEde2>::new_from_slices(&des_key, iv)
                    .map_err(|_| ErrorKind::InvalidInput("invalid 3DES key/IV length"))?;
                decrypt_in_place(dec, &mut buffer)?;
            }
            Self::Aes128 => {
                let dec = Decryptor::<Aes128>::new_from_slices(key, iv)
                    .map_err(|_| ErrorKind::InvalidInput("invalid AES-128 key/IV length"))?;
                decrypt_in_place(dec, &mut buffer)?;
            }
            Self::Aes192 => {
                let dec = Decryptor::<Aes192>::new_from_slices(key, iv)
                    .map_err(|_| ErrorKind::InvalidInput("invalid AES-192 key/IV length"))?;
                decrypt_in_place(dec, &mut buffer)?;
            }
            Self::Aes256 => {
                let dec = Decryptor::<Aes256>::new_from_slices(key, iv)
                    .map_err(|_| ErrorKind::InvalidInput("invalid AES-256 key/IV length"))?;
                decrypt_in_place(dec, &mut buffer)?;
            }
        }
        Ok(buffer)
    }

    /// Encrypts a single block with the cipher in ECB "mode" (i.e. one raw
    /// block encryption) -- used to derive the AES Secure Messaging IV as
    /// `E(KSenc, SSC)`.
    pub fn ecb_encrypt_block(self, key: &[u8], block: &[u8]) -> Result<Vec<u8>> {
        self.cbc_encrypt(key, &vec![0u8; self.block_size()], block)
    }
}

/// 3DES-EDE2 keys are 16 bytes (`K1 || K2`); the underlying `des` crate
/// wants the full 24-byte three-key form with `K3 = K1`.
fn tdes_ede2_key(key: &[u8]) -> Result<[u8; 24]> {
    if key.len() != 16 {
        return Err(ErrorKind::InvalidInput("3DES-EDE2 key must be 16 bytes").into());
    }
    let mut full = [0u8; 24];
    full[..16].copy_from_slice(key);
    full[16..].copy_from_slice(&key[..8]);
    Ok(full)
}

fn encrypt_in_place<C: BlockEncryptMut>(mut cipher: C, buffer: &mut [u8]) -> Result<()> {
    cipher
        .encrypt_padded_mut::<NoPadding>(buffer, buffer.len())
        .map_err(|_| ErrorKind::DecryptionFailed)?;
    Ok(())
}

fn decrypt_in_place<C: BlockDecryptMut>(mut cipher: C, buffer: &mut [u8]) -> Result<()> {
    cipher
        .decrypt_padded_mut::<NoPadding>(buffer)
        .map_err(|_| ErrorKind::DecryptionFailed)?;
    Ok(())
}

/// ISO/IEC 7816-4 padding method 2: append `0x80`, then zero bytes to the
/// next multiple of `block_size`. A full padding block is appended when
/// `data` is already block-aligned.
#[must_use]
pub fn pad(data: &[u8], block_size: usize) -> Vec<u8> {
    let mut padded = data.to_vec();
    padded.push(0x80);
    while padded.len() % block_size != 0 {
        padded.push(0x00);
    }
    padded
}

/// Reverses [`pad`]: strips trailing zero bytes, then the `0x80` marker
/// byte. If no `0x80` marker is found, `data` is returned unmodified (it is
/// treated as unpadded), per spec §4.2.
#[must_use]
pub fn unpad(data: &[u8]) -> Vec<u8> {
    match data.iter().rposition(|&b| b != 0x00) {
        Some(i) if data[i] == 0x80 => data[..i].to_vec(),
        _ => data.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_unpad_roundtrip_for_all_lengths_and_block_sizes() {
        for block_size in [8usize, 16] {
            for len in 0..=2 * block_size {
                let data: Vec<u8> = (0..len).map(|i| i as u8).collect();
                let padded = pad(&data, block_size);
                assert_eq!(padded.len() % block_size, 0);
                assert_eq!(unpad(&padded), data);
            }
        }
    }

    #[test]
    fn pad_appends_full_block_when_already_aligned() {
        let data = vec![0u8; 16];
        let padded = pad(&data, 8);
        assert_eq!(padded.len(), 24);
    }

    #[test]
    fn aes128_cbc_roundtrips() {
        let key = [0x11u8; 16];
        let iv = [0u8; 16];
        let plaintext = pad(b"hello, eMRTD!", BlockCipher::Aes128.block_size());
        let ciphertext = BlockCipher::Aes128.cbc_encrypt(&key, &iv, &plaintext).unwrap();
        let decrypted = BlockCipher::Aes128.cbc_decrypt(&key, &iv, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn tdes_cbc_roundtrips() {
        let key = [0x22u8; 16];
        let iv = [0u8; 8];
        let plaintext = pad(b"icao9303", BlockCipher::Tdes.block_size());
        let ciphertext = BlockCipher::Tdes.cbc_encrypt(&key, &iv, &plaintext).unwrap();
        let decrypted = BlockCipher::Tdes.cbc_decrypt(&key, &iv, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }
}
