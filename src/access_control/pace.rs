//! PACE Generic Mapping (ICAO 9303-11 §4.4, BSI TR-03110-3 §4.3): the
//! password-authenticated key establishment protocol that supersedes BAC,
//! running the same `GENERAL AUTHENTICATE` exchange over either a
//! Diffie-Hellman or an ECDH domain.

use {
    crate::{
        asn1::emrtd::security_info::{KeyAgreement, PaceInfo, PaceMapping, SymmetricCipher},
        crypto::{
            agreement::StandardizedDomainParameters,
            cipher::pad,
            kdf::SecurityConfiguration,
            mac::{aes_cmac, retail_mac},
            CryptoCoreRng,
        },
        error::{ErrorKind, Result},
        iso7816::{
            apdu::{encode_ber_length, general_authenticate, mse_set_at_pace, wrap_tlv},
            StatusWord,
        },
        nfc::{exchange, Transport},
        secure_messaging::{find_tlv, read_tlvs, SessionKeys},
    },
    der::{asn1::ObjectIdentifier as Oid, Encode},
    sha1::{Digest, Sha1},
    subtle::ConstantTimeEq,
};

/// Runs PACE-GM against `transport`, negotiating whichever key agreement
/// and cipher `pace_info` advertises, and returns the resulting zero-SSC
/// Secure Messaging channel.
pub fn run(
    transport: &mut dyn Transport,
    pace_info: &PaceInfo,
    mrz_key: &str,
    rng: &mut dyn CryptoCoreRng,
) -> Result<SessionKeys> {
    if pace_info.protocol.mapping != PaceMapping::Generic {
        return Err(ErrorKind::NotSupported("only PACE Generic Mapping is implemented").into());
    }
    let config = security_configuration(pace_info.protocol.cipher);
    let parameter_id = pace_info
        .parameter_id
        .ok_or(ErrorKind::NotSupported("PACE without a standardized domain parameter id"))?;
    let domain = StandardizedDomainParameters::from_parameter_id(parameter_id)?;

    let key_seed = Sha1::digest(mrz_key.as_bytes())[..16].to_vec();
    let k_pi = config.derive_pace_mapping_key(&key_seed);

    let oid: Oid = pace_info.protocol.into();
    let oid_der = oid.to_der().map_err(|e| ErrorKind::Internal(e.to_string()))?;
    let mut set_at_data = wrap_tlv(0x80, &oid_der);
    set_at_data.extend_from_slice(&wrap_tlv(0x83, &[0x01])); // password ref: MRZ
    set_at_data.extend_from_slice(&wrap_tlv(0x84, &[parameter_id as u8]));
    let (_, sw) = exchange(transport, &mse_set_at_pace(&set_at_data))?;
    check_sw(sw)?;

    // Round 1: the chip's encrypted nonce.
    let (resp1, sw1) = exchange(transport, &general_authenticate(&[], false))?;
    check_sw(sw1)?;
    let enc_nonce = find_tlv(&unwrap_dynamic_auth_data(&resp1)?, 0x80)
        .ok_or(ErrorKind::UnexpectedStructure("missing encrypted nonce"))?
        .to_vec();
    let iv = vec![0u8; config.block_cipher().block_size()];
    let nonce = config.block_cipher().cbc_decrypt(&k_pi, &iv, &enc_nonce)?;

    // Round 2: Generic Mapping, exchanging ephemeral mapping key pairs.
    // Fixed by round and direction (spec §4.5 steps 3-4), not by algorithm:
    // send 0x81, the chip always replies under 0x82.
    let (mapping_priv, mapping_pub) = domain.generate_keypair(rng);
    let (resp2, sw2) = exchange(transport, &general_authenticate(&wrap_tlv(0x81, &mapping_pub), false))?;
    check_sw(sw2)?;
    let chip_mapping_pub = find_tlv(&unwrap_dynamic_auth_data(&resp2)?, 0x82)
        .ok_or(ErrorKind::UnexpectedStructure("missing chip mapping public key"))?
        .to_vec();
    let shared_h = domain.agree(&mapping_priv, &chip_mapping_pub)?;
    let mapped = domain.map_generator(&nonce, &shared_h)?;

    // Round 3: key agreement on the mapped domain. Send 0x83, the chip
    // always replies under 0x84.
    let (eph_priv, eph_pub) = mapped.generate_keypair(rng);
    let (resp3, sw3) = exchange(transport, &general_authenticate(&wrap_tlv(0x83, &eph_pub), false))?;
    check_sw(sw3)?;
    let chip_eph_pub = find_tlv(&unwrap_dynamic_auth_data(&resp3)?, 0x84)
        .ok_or(ErrorKind::UnexpectedStructure("missing chip ephemeral public key"))?
        .to_vec();
    let shared_k = mapped.agree(&eph_priv, &chip_eph_pub)?;
    let (ks_enc, ks_mac) = config.derive_session_keys(&shared_k);

    // Round 4: mutual authentication tokens.
    let token_pk_tag = match pace_info.protocol.key_agreement {
        KeyAgreement::Dh => 0x84,
        KeyAgreement::Ecdh => 0x86,
    };
    let t_ifd = compute_token(config, &ks_mac, &oid_der, token_pk_tag, &chip_eph_pub)?;
    let (resp4, sw4) = exchange(transport, &general_authenticate(&wrap_tlv(0x85, &t_ifd), false))?;
    check_sw(sw4)?;
    let t_ic = find_tlv(&unwrap_dynamic_auth_data(&resp4)?, 0x86)
        .ok_or(ErrorKind::UnexpectedStructure("missing chip authentication token"))?;
    let t_ic_arr: [u8; 8] = t_ic.try_into().map_err(|_| ErrorKind::PaceTokenMismatch)?;
    let expected_t_ic = compute_token(config, &ks_mac, &oid_der, token_pk_tag, &eph_pub)?;
    if expected_t_ic.ct_ne(&t_ic_arr).into() {
        return Err(ErrorKind::PaceTokenMismatch.into());
    }

    Ok(SessionKeys::new_zero_ssc(config, ks_enc, ks_mac))
}

fn security_configuration(cipher: SymmetricCipher) -> SecurityConfiguration {
    match cipher {
        SymmetricCipher::Tdes => SecurityConfiguration::Tdes,
        SymmetricCipher::Aes128 => SecurityConfiguration::Aes128,
        SymmetricCipher::Aes192 => SecurityConfiguration::Aes192,
        SymmetricCipher::Aes256 => SecurityConfiguration::Aes256,
    }
}

fn check_sw(sw: StatusWord) -> Result<()> {
    if sw == StatusWord::SUCCESS {
        Ok(())
    } else {
        Err(ErrorKind::Apdu(sw).into())
    }
}

/// Unwraps the dynamic authentication data template (`7C`) every
/// `GENERAL AUTHENTICATE` response is carried in, returning its inner
/// tagged objects.
fn unwrap_dynamic_auth_data(response: &[u8]) -> Result<Vec<(u8, Vec<u8>)>> {
    let outer = read_tlvs(response)?;
    let inner = find_tlv(&outer, 0x7C).ok_or(ErrorKind::UnexpectedStructure("missing dynamic authentication data"))?;
    read_tlvs(inner)
}

/// Computes a PACE authentication token (BSI TR-03110-3 §3.4.2): the MAC,
/// under the session MAC key, of `'7F49' (OID ‖ TLV(pk_tag, public_key))`.
/// 3DES uses Retail MAC over ISO 7816-4 padded input; AES uses plain
/// AES-CMAC, which needs no external padding.
fn compute_token(
    config: SecurityConfiguration,
    ks_mac: &[u8],
    oid_der: &[u8],
    pk_tag: u8,
    public_key: &[u8],
) -> Result<[u8; 8]> {
    let mut inner = oid_der.to_vec();
    inner.extend_from_slice(&wrap_tlv(pk_tag, public_key));
    let mut content = vec![0x7F, 0x49];
    encode_ber_length(&mut content, inner.len());
    content.extend_from_slice(&inner);

    Ok(match config {
        SecurityConfiguration::Tdes => retail_mac(ks_mac, &pad(&content, 8))?,
        _ => {
            let tag = aes_cmac(ks_mac, &content)?;
            let mut truncated = [0u8; 8];
            truncated.copy_from_slice(&tag[..8]);
            truncated
        }
    })
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{asn1::emrtd::security_info::PaceProtocol, iso7816::parse_apdu},
    };

    /// A canned chip implementing the PACE-ECDH-GM happy path over
    /// BrainpoolP256r1 (parameter id 13), so the whole round-trip can be
    /// exercised without real hardware. Keeps only plain byte buffers
    /// between rounds (never a borrowed [`crate::crypto::agreement::MappedGenerator`])
    /// so the mapped generator is recomputed fresh whenever a round needs
    /// it, rather than stored self-referentially.
    struct FakeChip {
        config:  SecurityConfiguration,
        domain:  StandardizedDomainParameters,
        k_pi:    Vec<u8>,
        nonce:   Vec<u8>,
        oid_der: Vec<u8>,
        shared_h: Option<Vec<u8>>,
        eph_pub:  Option<Vec<u8>>,
        ks_mac:   Option<Vec<u8>>,
    }

    impl Transport for FakeChip {
        fn send(&mut self, command: &[u8]) -> Result<(Vec<u8>, u8, u8)> {
            let apdu = parse_apdu(command).map_err(|_| ErrorKind::TruncatedField)?;
            match (apdu.cla(), apdu.ins()) {
                (0x00, 0x22) => Ok((vec![], 0x90, 0x00)), // MSE:Set AT
                (0x00 | 0x10, 0x86) => {
                    let inner = unwrap_dynamic_auth_data(apdu.data)?;
                    if inner.is_empty() {
                        // Round 1: return the encrypted nonce.
                        let iv = vec![0u8; self.config.block_cipher().block_size()];
                        let enc_nonce = self.config.block_cipher().cbc_encrypt(&self.k_pi, &iv, &self.nonce).unwrap();
                        let body = wrap_tlv(0x80, &enc_nonce);
                        return Ok((wrap_tlv(0x7C, &body), 0x90, 0x00));
                    }
                    if let Some(ifd_map_pub) = find_tlv(&inner, 0x81) {
                        let (chip_map_priv, chip_map_pub) = self.domain.generate_keypair(&mut rand::rngs::OsRng);
                        let shared_h = self.domain.agree(&chip_map_priv, ifd_map_pub).unwrap();
                        self.shared_h = Some(shared_h);
                        let body = wrap_tlv(0x82, &chip_map_pub);
                        return Ok((wrap_tlv(0x7C, &body), 0x90, 0x00));
                    }
                    if let Some(ifd_eph_pub) = find_tlv(&inner, 0x83) {
                        let shared_h = self.shared_h.clone().unwrap();
                        let mapped = self.domain.map_generator(&self.nonce, &shared_h).unwrap();
                        let (chip_eph_priv, chip_eph_pub) = mapped.generate_keypair(&mut rand::rngs::OsRng);
                        let shared_k = mapped.agree(&chip_eph_priv, ifd_eph_pub).unwrap();
                        let (_, ks_mac) = self.config.derive_session_keys(&shared_k);
                        self.eph_pub = Some(ifd_eph_pub.to_vec());
                        self.ks_mac = Some(ks_mac);
                        let body = wrap_tlv(0x84, &chip_eph_pub);
                        return Ok((wrap_tlv(0x7C, &body), 0x90, 0x00));
                    }
                    if find_tlv(&inner, 0x85).is_some() {
                        let ks_mac = self.ks_mac.clone().unwrap();
                        let ifd_eph_pub = self.eph_pub.clone().unwrap();
                        let t_ic = compute_token(self.config, &ks_mac, &self.oid_der, 0x86, &ifd_eph_pub).unwrap();
                        let body = wrap_tlv(0x86, &t_ic);
                        return Ok((wrap_tlv(0x7C, &body), 0x90, 0x00));
                    }
                    panic!("unexpected GENERAL AUTHENTICATE round");
                }
                _ => panic!("unexpected instruction"),
            }
        }
    }

    #[test]
    fn ecdh_gm_happy_path_establishes_zero_ssc_channel() {
        let protocol = PaceProtocol {
            key_agreement: KeyAgreement::Ecdh,
            mapping:        PaceMapping::Generic,
            cipher:         SymmetricCipher::Aes128,
        };
        let pace_info = PaceInfo { protocol, version: 2, parameter_id: Some(13) };
        let oid: Oid = protocol.into();
        let oid_der = oid.to_der().unwrap();
        let config = SecurityConfiguration::Aes128;
        let domain = StandardizedDomainParameters::from_parameter_id(13).unwrap();
        let key_seed = Sha1::digest(b"L898902C<369080619406236")[..16].to_vec();
        let k_pi = config.derive_pace_mapping_key(&key_seed);

        let mut chip = FakeChip {
            config,
            domain,
            k_pi,
            nonce: vec![0x11u8; 16],
            oid_der,
            shared_h: None,
            eph_pub: None,
            ks_mac: None,
        };
        let mut rng = rand::rngs::OsRng;
        let _keys = run(&mut chip, &pace_info, "L898902C<369080619406236", &mut rng).unwrap();
    }
}
