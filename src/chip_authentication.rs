//! Chip Authentication (ICAO 9303-11 §9.2.11, spec §4.6): ephemeral
//! Diffie-Hellman/ECDH against the chip's static public key (from `DG14`),
//! run inside the channel BAC or PACE already opened, replacing it with a
//! freshly keyed one.

use crate::{
    asn1::{
        emrtd::security_info::{ChipAuthenticationInfo, ChipAuthenticationProtocol, ChipAuthenticationPublicKeyInfo},
        public_key_info::{PubkeyAlgorithmIdentifier, SubjectPublicKeyInfo},
    },
    crypto::{agreement::StandardizedDomainParameters, kdf::SecurityConfiguration, CryptoCoreRng},
    error::{ErrorKind, Result},
    iso7816::{
        apdu::{append_lc, mse_set_at_ca, mse_set_kat, wrap_tlv},
        StatusWord,
    },
    nfc::{exchange, Transport},
    secure_messaging::SessionKeys,
};

/// Runs Chip Authentication against `transport`, sending every command
/// through `channel` (the session BAC or PACE established) and returning
/// the freshly re-keyed, zero-SSC replacement channel.
pub fn run(
    transport: &mut dyn Transport,
    channel: &mut SessionKeys,
    ca_info: &ChipAuthenticationInfo,
    static_key_info: &ChipAuthenticationPublicKeyInfo,
    rng: &mut dyn CryptoCoreRng,
) -> Result<SessionKeys> {
    let cipher = ca_info
        .protocol
        .cipher
        .ok_or(ErrorKind::NotSupported("Chip Authentication protocol cipher not resolved"))?;
    let config = security_configuration(cipher);

    let algorithm = spki_algorithm(&static_key_info.chip_authentication_public_key)?;
    let domain = StandardizedDomainParameters::from_algorithm(&algorithm)?;
    let static_pub = spki_public_value(&static_key_info.chip_authentication_public_key)?;

    let (eph_priv, eph_pub) = domain.generate_keypair(rng);
    send_ephemeral_public_key(transport, channel, config, ca_info.protocol, static_key_info.key_id, &eph_pub)?;

    let shared_k = domain.agree(&eph_priv, static_pub)?;
    let (ks_enc, ks_mac) = config.derive_session_keys(&shared_k);
    Ok(SessionKeys::new_zero_ssc(config, ks_enc, ks_mac))
}

fn security_configuration(cipher: crate::asn1::emrtd::security_info::SymmetricCipher) -> SecurityConfiguration {
    use crate::asn1::emrtd::security_info::SymmetricCipher;
    match cipher {
        SymmetricCipher::Tdes => SecurityConfiguration::Tdes,
        SymmetricCipher::Aes128 => SecurityConfiguration::Aes128,
        SymmetricCipher::Aes192 => SecurityConfiguration::Aes192,
        SymmetricCipher::Aes256 => SecurityConfiguration::Aes256,
    }
}

fn spki_algorithm(spki: &SubjectPublicKeyInfo) -> Result<PubkeyAlgorithmIdentifier> {
    match spki {
        SubjectPublicKeyInfo::Unknown(any) => PubkeyAlgorithmIdentifier::try_from(&any.algorithm)
            .map_err(|e| ErrorKind::Internal(e.to_string()).into()),
        SubjectPublicKeyInfo::Rsa(_) => Err(ErrorKind::NotSupported("RSA is not a key agreement algorithm").into()),
    }
}

fn spki_public_value(spki: &SubjectPublicKeyInfo) -> Result<&[u8]> {
    match spki {
        SubjectPublicKeyInfo::Unknown(any) => Ok(any.subject_public_key.raw_bytes()),
        SubjectPublicKeyInfo::Rsa(_) => Err(ErrorKind::NotSupported("RSA is not a key agreement algorithm").into()),
    }
}

/// Minimal big-endian encoding of a key id, per `INTEGER` conventions (at
/// least one byte, no superfluous leading zero bytes).
fn encode_key_id(id: u64) -> Vec<u8> {
    let be = id.to_be_bytes();
    let trim = be.iter().position(|&b| b != 0).unwrap_or(be.len() - 1);
    be[trim..].to_vec()
}

/// Sends the ephemeral public key per spec §4.6 step 2: a single
/// `MSE:Set KAT` for 3DES, or `MSE:Set AT` followed by a 224-byte chained
/// `GENERAL AUTHENTICATE` sequence for AES.
fn send_ephemeral_public_key(
    transport: &mut dyn Transport,
    channel: &mut SessionKeys,
    config: SecurityConfiguration,
    protocol: ChipAuthenticationProtocol,
    key_id: Option<u64>,
    eph_pub: &[u8],
) -> Result<()> {
    match config {
        SecurityConfiguration::Tdes => {
            let mut data = wrap_tlv(0x91, eph_pub);
            if let Some(id) = key_id {
                data.extend_from_slice(&wrap_tlv(0x84, &encode_key_id(id)));
            }
            send_protected(transport, channel, &mse_set_kat(&data))?;
            Ok(())
        }
        _ => {
            let oid: der::asn1::ObjectIdentifier = protocol.into();
            let oid_der = der::Encode::to_der(&oid).map_err(|e| ErrorKind::Internal(e.to_string()))?;
            let mut set_at_data = wrap_tlv(0x80, &oid_der);
            if let Some(id) = key_id {
                set_at_data.extend_from_slice(&wrap_tlv(0x84, &encode_key_id(id)));
            }
            send_protected(transport, channel, &mse_set_at_ca(&set_at_data))?;

            let body = wrap_tlv(0x7C, &wrap_tlv(0x80, eph_pub));
            let chunks: Vec<&[u8]> = body.chunks(224).collect();
            for (index, chunk) in chunks.iter().enumerate() {
                let chaining = index + 1 < chunks.len();
                send_protected(transport, channel, &general_authenticate_raw(chunk, chaining))?;
            }
            Ok(())
        }
    }
}

/// Builds a `GENERAL AUTHENTICATE` APDU carrying a raw chunk of an
/// already-built dynamic authentication data template, without re-wrapping
/// it in its own `7C` tag: command chaining splits one logical TLV stream
/// across several APDUs, so only the first chunk's bytes start with `7C`.
fn general_authenticate_raw(chunk: &[u8], chaining: bool) -> Vec<u8> {
    let cla = if chaining { 0x10 } else { 0x00 };
    let mut apdu = vec![cla, 0x86, 0x00, 0x00];
    append_lc(&mut apdu, chunk);
    apdu.extend_from_slice(chunk);
    apdu.push(0x00);
    apdu
}

/// Protects `command` under `channel`, sends it, and unprotects the reply.
fn send_protected(transport: &mut dyn Transport, channel: &mut SessionKeys, command: &[u8]) -> Result<(Vec<u8>, StatusWord)> {
    let protected = channel.protect(command)?;
    let (data, sw) = exchange(transport, &protected)?;
    channel.unprotect(&data, sw)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            asn1::{
                emrtd::security_info::{KeyAgreement, SymmetricCipher},
                public_key_info::{AnySubjectPublicKeyInfo, DhAlgoParameters},
                AnyAlgorithmIdentifier,
            },
            crypto::{
                cipher::pad,
                mac::{aes_cmac, retail_mac},
            },
        },
        der::asn1::{BitString, Int, ObjectIdentifier as Oid},
    };

    /// A canned chip that never validates command content (`run` itself
    /// never checks the chip's `GENERAL AUTHENTICATE` replies, only that
    /// Secure Messaging unwraps them to `SW=9000`), just mirrors the
    /// channel's own Send-Sequence-Counter so the MAC it returns verifies.
    /// Counts rounds so the test can confirm real command chaining, not
    /// just a single-chunk send, actually occurred.
    struct FakeChip {
        config: SecurityConfiguration,
        ks_mac: Vec<u8>,
        ssc:    Vec<u8>,
        rounds: usize,
    }

    impl FakeChip {
        fn increment_ssc(&mut self) {
            for byte in self.ssc.iter_mut().rev() {
                *byte = byte.wrapping_add(1);
                if *byte != 0 {
                    break;
                }
            }
        }
    }

    impl Transport for FakeChip {
        fn send(&mut self, _command: &[u8]) -> Result<(Vec<u8>, u8, u8)> {
            self.rounds += 1;
            // Mirrors the real channel's own two increments per round trip
            // (`protect`, then `unprotect`) so the MAC below lands at the
            // SSC value the caller's `unprotect` will actually check.
            self.increment_ssc();
            self.increment_ssc();
            let do99 = wrap_tlv(0x99, &[0x90, 0x00]);
            let mut n = self.ssc.clone();
            n.extend_from_slice(&do99);
            let padded = pad(&n, self.config.block_cipher().block_size());
            let tag = match self.config {
                SecurityConfiguration::Tdes => retail_mac(&self.ks_mac, &padded).unwrap(),
                _ => {
                    let full = aes_cmac(&self.ks_mac, &padded).unwrap();
                    let mut truncated = [0u8; 8];
                    truncated.copy_from_slice(&full[..8]);
                    truncated
                }
            };
            let mut response = do99;
            response.extend_from_slice(&wrap_tlv(0x8E, &tag));
            Ok((response, 0x90, 0x00))
        }
    }

    /// RFC 5114's 2048-bit MODP group with 256-bit prime order subgroup
    /// (`StandardizedDomainParameters::Group3`/parameter id 2): the only
    /// standardized domain parameter set whose wrapped ephemeral public
    /// key exceeds 224 bytes, so it is the one that actually forces the
    /// chained `GENERAL AUTHENTICATE` path this test targets.
    fn group3_modulus_bytes() -> Vec<u8> {
        hex::decode(
            "87A8E61DB4B6663CFFBBD19C651959998CEEF608660DD0F25D2CEED4435E3B0\
             0E00DF8F1D61957D4FAF7DF4561B2AA3016C3D91134096FAA3BF4296D830E9A\
             7C209E0C6497517ABD5A8A9D306BCF67ED91F9E6725B4758C022E0B1EF4275B\
             F7B6C5BFC11D45F9088B941F54EB1E59BB8BC39A0BF12307F5C4FDB70C581B2\
             3F76B63ACAE1CAA6B7902D52526735488A0EF13C6D9A51BFA4AB3AD83477965\
             24D8EF6A167B5A41825D967E144E5140564251CCACB83E6B486F6B3CA3F7971\
             506026C0B857F689962856DED4010ABD0BE621C3A3960A54E710C375F26375D\
             7014103A4B54330C198AF126116D2276E11715F693877FAD7EF09CADB094AE9\
             1E1A1597",
        )
        .unwrap()
    }

    /// `Int` is a signed `INTEGER`; a modulus whose top bit is set needs an
    /// extra leading `0x00` byte to stay non-negative in DER.
    fn as_der_integer(bytes: &[u8]) -> Vec<u8> {
        if bytes.first().is_some_and(|b| b & 0x80 != 0) {
            let mut padded = vec![0u8];
            padded.extend_from_slice(bytes);
            padded
        } else {
            bytes.to_vec()
        }
    }

    #[test]
    fn aes_chained_general_authenticate_round_trip_rekeys_channel() {
        // A DH static key advertised over Group3, large enough that the
        // wrapped ephemeral public key must be split across two chained
        // `GENERAL AUTHENTICATE` commands (spec §8 scenario 5).
        let domain = StandardizedDomainParameters::from_parameter_id(2).unwrap();
        let mut rng = rand::rngs::OsRng;
        let (_, static_pub) = domain.generate_keypair(&mut rng);

        let dh_params = DhAlgoParameters {
            prime: Int::new(&as_der_integer(&group3_modulus_bytes())).unwrap(),
            base: Int::new(&[2]).unwrap(),
            private_value_length: None,
        };
        let spki = SubjectPublicKeyInfo::Unknown(AnySubjectPublicKeyInfo {
            algorithm: AnyAlgorithmIdentifier {
                algorithm:  Oid::new_unwrap("1.2.840.10046.2.1"),
                parameters: Some(der::Any::encode_from(&dh_params).unwrap()),
            },
            subject_public_key: BitString::new(0, static_pub).unwrap(),
        });
        let static_key_info = ChipAuthenticationPublicKeyInfo {
            protocol: Oid::new_unwrap("0.4.0.127.0.7.2.2.1.1"),
            chip_authentication_public_key: spki,
            key_id: None,
        };
        let ca_info = ChipAuthenticationInfo {
            protocol: ChipAuthenticationProtocol {
                key_agreement: KeyAgreement::Dh,
                cipher:        Some(SymmetricCipher::Aes128),
            },
            version: 1,
            key_id:  None,
        };

        let config = SecurityConfiguration::Aes128;
        let ks_mac = vec![0x22u8; 16];
        let mut channel = SessionKeys::new_zero_ssc(config, vec![0x11u8; 16], ks_mac.clone());
        let mut chip = FakeChip { config, ks_mac, ssc: vec![0u8; 16], rounds: 0 };

        let rekeyed = run(&mut chip, &mut channel, &ca_info, &static_key_info, &mut rng).unwrap();
        assert_eq!(chip.rounds, 3); // MSE:Set AT + two chained GENERAL AUTHENTICATE chunks
        let _ = rekeyed;
    }

    #[test]
    fn chunks_a_large_ephemeral_key_with_chaining() {
        // A synthetic 400-byte chunk split at 224 bytes must produce two
        // pieces, the first chained, the second not.
        let body = wrap_tlv(0x7C, &wrap_tlv(0x80, &vec![0xAAu8; 400]));
        let chunks: Vec<&[u8]> = body.chunks(224).collect();
        assert_eq!(chunks.len(), 2);
        let first = general_authenticate_raw(chunks[0], true);
        let second = general_authenticate_raw(chunks[1], false);
        assert_eq!(first[0], 0x10);
        assert_eq!(second[0], 0x00);
    }

    #[test]
    fn encode_key_id_trims_leading_zeros() {
        assert_eq!(encode_key_id(0), vec![0x00]);
        assert_eq!(encode_key_id(1), vec![0x01]);
        assert_eq!(encode_key_id(256), vec![0x01, 0x00]);
    }
}
