//! `SecurityInfo` (BSI TR-03110-3 Annex A.1), the SET-OF-tagged-union found
//! in `EF.CardAccess` and `EF.DG14` that advertises which of PACE, Chip
//! Authentication, Terminal Authentication, and Active Authentication a
//! chip supports, and with which domain parameters/ciphers.
//!
//! Each concrete `*Info` struct below is itself the complete ASN.1 SEQUENCE
//! (its first field is the discriminating `protocol` OID), so the
//! [`SecurityInfo`] enum's `Decode`/`Encode` impls just have to pick the
//! right concrete type to delegate to and otherwise get out of the way.

use {
    super::super::{public_key_info::SubjectPublicKeyInfo, AnyAlgorithmIdentifier, OrderedSet},
    der::{
        asn1::{Any, ObjectIdentifier as Oid},
        Decode, DecodeValue, Encode, EncodeValue, FixedTag, Header, Length, Reader, Result,
        Sequence, SliceReader, Tag, ValueOrd, Writer,
    },
    std::cmp::Ordering,
};

// --- OID arcs (BSI TR-03110-3 Annex A.1.1, under the `id-PACE`/`id-CA`/
// `id-PK` arcs 0.4.0.127.0.7.2.2.{4,3,1}) -----------------------------------

/// `id-TA`, recognized so `SecurityInfo` parsing doesn't choke on a
/// Terminal-Authentication-capable chip; the protocol itself is out of
/// scope (see spec Non-goals).
pub const ID_TA: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.2");
/// `id-icao-mrtd-security-aaProtocolObject`; Active Authentication is out
/// of scope, recognized for the same reason as `id-TA`.
pub const ID_AA: Oid = Oid::new_unwrap("2.23.136.1.1.5");

const ID_PACE_DH_GM: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.1");
const ID_PACE_ECDH_GM: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.2");
const ID_PACE_DH_IM: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.3");
const ID_PACE_ECDH_IM: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.4");
const ID_PACE_ECDH_CAM: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.6");

const ID_PACE_DH_GM_3DES_CBC_CBC: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.1.1");
const ID_PACE_DH_GM_AES_CBC_CMAC_128: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.1.2");
const ID_PACE_DH_GM_AES_CBC_CMAC_192: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.1.3");
const ID_PACE_DH_GM_AES_CBC_CMAC_256: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.1.4");
const ID_PACE_ECDH_GM_3DES_CBC_CBC: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.2.1");
const ID_PACE_ECDH_GM_AES_CBC_CMAC_128: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.2.2");
const ID_PACE_ECDH_GM_AES_CBC_CMAC_192: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.2.3");
const ID_PACE_ECDH_GM_AES_CBC_CMAC_256: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.2.4");
const ID_PACE_DH_IM_3DES_CBC_CBC: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.3.1");
const ID_PACE_DH_IM_AES_CBC_CMAC_128: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.3.2");
const ID_PACE_DH_IM_AES_CBC_CMAC_192: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.3.3");
const ID_PACE_DH_IM_AES_CBC_CMAC_256: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.3.4");
const ID_PACE_ECDH_IM_3DES_CBC_CBC: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.4.1");
const ID_PACE_ECDH_IM_AES_CBC_CMAC_128: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.4.2");
const ID_PACE_ECDH_IM_AES_CBC_CMAC_192: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.4.3");
const ID_PACE_ECDH_IM_AES_CBC_CMAC_256: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.4.4");
const ID_PACE_ECDH_CAM_AES_CBC_CMAC_128: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.6.2");
const ID_PACE_ECDH_CAM_AES_CBC_CMAC_192: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.6.3");
const ID_PACE_ECDH_CAM_AES_CBC_CMAC_256: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.4.6.4");

const ID_CA_DH_3DES_CBC_CBC: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.3.1.1");
const ID_CA_DH_AES_CBC_CMAC_128: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.3.1.2");
const ID_CA_DH_AES_CBC_CMAC_192: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.3.1.3");
const ID_CA_DH_AES_CBC_CMAC_256: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.3.1.4");
const ID_CA_ECDH_3DES_CBC_CBC: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.3.2.1");
const ID_CA_ECDH_AES_CBC_CMAC_128: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.3.2.2");
const ID_CA_ECDH_AES_CBC_CMAC_192: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.3.2.3");
const ID_CA_ECDH_AES_CBC_CMAC_256: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.3.2.4");

const ID_PK_DH: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.1.1");
const ID_PK_ECDH: Oid = Oid::new_unwrap("0.4.0.127.0.7.2.2.1.2");

// --- Protocol parameter taxonomy -------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum KeyAgreement {
    Dh,
    Ecdh,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum SymmetricCipher {
    Tdes,
    Aes128,
    Aes192,
    Aes256,
}

/// How the PACE ephemeral domain parameters are derived from the static
/// ones. Only `Generic` is implemented; `Integrated` and
/// `ChipAuthenticationMapping` are recognized so parsing doesn't fail on a
/// chip that advertises them, per spec Non-goals.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum PaceMapping {
    Generic,
    Integrated,
    ChipAuthenticationMapping,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct PaceProtocol {
    pub key_agreement: KeyAgreement,
    pub mapping:        PaceMapping,
    pub cipher:         SymmetricCipher,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct ChipAuthenticationProtocol {
    pub key_agreement: KeyAgreement,
    pub cipher:         Option<SymmetricCipher>,
}

impl TryFrom<Oid> for PaceProtocol {
    type Error = UnknownProtocolOid;

    fn try_from(oid: Oid) -> std::result::Result<Self, UnknownProtocolOid> {
        use {KeyAgreement::{Dh, Ecdh}, PaceMapping::{ChipAuthenticationMapping, Generic, Integrated}, SymmetricCipher::{Aes128, Aes192, Aes256, Tdes}};
        Ok(match oid {
            ID_PACE_DH_GM_3DES_CBC_CBC => Self { key_agreement: Dh, mapping: Generic, cipher: Tdes },
            ID_PACE_DH_GM_AES_CBC_CMAC_128 => Self { key_agreement: Dh, mapping: Generic, cipher: Aes128 },
            ID_PACE_DH_GM_AES_CBC_CMAC_192 => Self { key_agreement: Dh, mapping: Generic, cipher: Aes192 },
            ID_PACE_DH_GM_AES_CBC_CMAC_256 => Self { key_agreement: Dh, mapping: Generic, cipher: Aes256 },
            ID_PACE_ECDH_GM_3DES_CBC_CBC => Self { key_agreement: Ecdh, mapping: Generic, cipher: Tdes },
            ID_PACE_ECDH_GM_AES_CBC_CMAC_128 => Self { key_agreement: Ecdh, mapping: Generic, cipher: Aes128 },
            ID_PACE_ECDH_GM_AES_CBC_CMAC_192 => Self { key_agreement: Ecdh, mapping: Generic, cipher: Aes192 },
            ID_PACE_ECDH_GM_AES_CBC_CMAC_256 => Self { key_agreement: Ecdh, mapping: Generic, cipher: Aes256 },
            ID_PACE_DH_IM_3DES_CBC_CBC => Self { key_agreement: Dh, mapping: Integrated, cipher: Tdes },
            ID_PACE_DH_IM_AES_CBC_CMAC_128 => Self { key_agreement: Dh, mapping: Integrated, cipher: Aes128 },
            ID_PACE_DH_IM_AES_CBC_CMAC_192 => Self { key_agreement: Dh, mapping: Integrated, cipher: Aes192 },
            ID_PACE_DH_IM_AES_CBC_CMAC_256 => Self { key_agreement: Dh, mapping: Integrated, cipher: Aes256 },
            ID_PACE_ECDH_IM_3DES_CBC_CBC => Self { key_agreement: Ecdh, mapping: Integrated, cipher: Tdes },
            ID_PACE_ECDH_IM_AES_CBC_CMAC_128 => Self { key_agreement: Ecdh, mapping: Integrated, cipher: Aes128 },
            ID_PACE_ECDH_IM_AES_CBC_CMAC_192 => Self { key_agreement: Ecdh, mapping: Integrated, cipher: Aes192 },
            ID_PACE_ECDH_IM_AES_CBC_CMAC_256 => Self { key_agreement: Ecdh, mapping: Integrated, cipher: Aes256 },
            ID_PACE_ECDH_CAM_AES_CBC_CMAC_128 => Self { key_agreement: Ecdh, mapping: ChipAuthenticationMapping, cipher: Aes128 },
            ID_PACE_ECDH_CAM_AES_CBC_CMAC_192 => Self { key_agreement: Ecdh, mapping: ChipAuthenticationMapping, cipher: Aes192 },
            ID_PACE_ECDH_CAM_AES_CBC_CMAC_256 => Self { key_agreement: Ecdh, mapping: ChipAuthenticationMapping, cipher: Aes256 },
            other => return Err(UnknownProtocolOid(other)),
        })
    }
}

impl From<PaceProtocol> for Oid {
    fn from(protocol: PaceProtocol) -> Self {
        use {KeyAgreement::{Dh, Ecdh}, PaceMapping::{ChipAuthenticationMapping, Generic, Integrated}, SymmetricCipher::{Aes128, Aes192, Aes256, Tdes}};
        match (protocol.key_agreement, protocol.mapping, protocol.cipher) {
            (Dh, Generic, Tdes) => ID_PACE_DH_GM_3DES_CBC_CBC,
            (Dh, Generic, Aes128) => ID_PACE_DH_GM_AES_CBC_CMAC_128,
            (Dh, Generic, Aes192) => ID_PACE_DH_GM_AES_CBC_CMAC_192,
            (Dh, Generic, Aes256) => ID_PACE_DH_GM_AES_CBC_CMAC_256,
            (Ecdh, Generic, Tdes) => ID_PACE_ECDH_GM_3DES_CBC_CBC,
            (Ecdh, Generic, Aes128) => ID_PACE_ECDH_GM_AES_CBC_CMAC_128,
            (Ecdh, Generic, Aes192) => ID_PACE_ECDH_GM_AES_CBC_CMAC_192,
            (Ecdh, Generic, Aes256) => ID_PACE_ECDH_GM_AES_CBC_CMAC_256,
            (Dh, Integrated, Tdes) => ID_PACE_DH_IM_3DES_CBC_CBC,
            (Dh, Integrated, Aes128) => ID_PACE_DH_IM_AES_CBC_CMAC_128,
            (Dh, Integrated, Aes192) => ID_PACE_DH_IM_AES_CBC_CMAC_192,
            (Dh, Integrated, Aes256) => ID_PACE_DH_IM_AES_CBC_CMAC_256,
            (Ecdh, Integrated, Tdes) => ID_PACE_ECDH_IM_3DES_CBC_CBC,
            (Ecdh, Integrated, Aes128) => ID_PACE_ECDH_IM_AES_CBC_CMAC_128,
            (Ecdh, Integrated, Aes192) => ID_PACE_ECDH_IM_AES_CBC_CMAC_192,
            (Ecdh, Integrated, Aes256) => ID_PACE_ECDH_IM_AES_CBC_CMAC_256,
            (Ecdh, ChipAuthenticationMapping, Aes128) => ID_PACE_ECDH_CAM_AES_CBC_CMAC_128,
            (Ecdh, ChipAuthenticationMapping, Aes192) => ID_PACE_ECDH_CAM_AES_CBC_CMAC_192,
            (Ecdh, ChipAuthenticationMapping, Aes256) => ID_PACE_ECDH_CAM_AES_CBC_CMAC_256,
            // DH has no ChipAuthenticationMapping variant, nor does CAM define
            // a 3DES cipher; these combinations cannot arise from `TryFrom`.
            _ => unreachable!("no standardized OID for this PaceProtocol combination"),
        }
    }
}

impl TryFrom<Oid> for ChipAuthenticationProtocol {
    type Error = UnknownProtocolOid;

    fn try_from(oid: Oid) -> std::result::Result<Self, UnknownProtocolOid> {
        use {KeyAgreement::{Dh, Ecdh}, SymmetricCipher::{Aes128, Aes192, Aes256, Tdes}};
        Ok(match oid {
            ID_CA_DH_3DES_CBC_CBC => Self { key_agreement: Dh, cipher: Some(Tdes) },
            ID_CA_DH_AES_CBC_CMAC_128 => Self { key_agreement: Dh, cipher: Some(Aes128) },
            ID_CA_DH_AES_CBC_CMAC_192 => Self { key_agreement: Dh, cipher: Some(Aes192) },
            ID_CA_DH_AES_CBC_CMAC_256 => Self { key_agreement: Dh, cipher: Some(Aes256) },
            ID_CA_ECDH_3DES_CBC_CBC => Self { key_agreement: Ecdh, cipher: Some(Tdes) },
            ID_CA_ECDH_AES_CBC_CMAC_128 => Self { key_agreement: Ecdh, cipher: Some(Aes128) },
            ID_CA_ECDH_AES_CBC_CMAC_192 => Self { key_agreement: Ecdh, cipher: Some(Aes192) },
            ID_CA_ECDH_AES_CBC_CMAC_256 => Self { key_agreement: Ecdh, cipher: Some(Aes256) },
            other => return Err(UnknownProtocolOid(other)),
        })
    }
}

impl From<ChipAuthenticationProtocol> for Oid {
    fn from(protocol: ChipAuthenticationProtocol) -> Self {
        use {KeyAgreement::{Dh, Ecdh}, SymmetricCipher::{Aes128, Aes192, Aes256, Tdes}};
        match (protocol.key_agreement, protocol.cipher) {
            (Dh, Some(Tdes)) => ID_CA_DH_3DES_CBC_CBC,
            (Dh, Some(Aes128)) => ID_CA_DH_AES_CBC_CMAC_128,
            (Dh, Some(Aes192)) => ID_CA_DH_AES_CBC_CMAC_192,
            (Dh, Some(Aes256)) => ID_CA_DH_AES_CBC_CMAC_256,
            (Ecdh, Some(Tdes)) => ID_CA_ECDH_3DES_CBC_CBC,
            (Ecdh, Some(Aes128)) => ID_CA_ECDH_AES_CBC_CMAC_128,
            (Ecdh, Some(Aes192)) => ID_CA_ECDH_AES_CBC_CMAC_192,
            (Ecdh, Some(Aes256)) => ID_CA_ECDH_AES_CBC_CMAC_256,
            (_, None) => ID_CA_ECDH_3DES_CBC_CBC, // synthesized fallback, see EfDg14::chip_authentication
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct UnknownProtocolOid(pub Oid);

/// Delegates a protocol-taxonomy Rust type's DER representation to the plain
/// `OBJECT IDENTIFIER` it's encoded as, so it can be used as a `Sequence`
/// field directly instead of every `*Info` struct storing a raw `Oid`.
macro_rules! oid_delegated_field {
    ($ty:ty) => {
        impl FixedTag for $ty {
            const TAG: Tag = <Oid as FixedTag>::TAG;
        }

        impl<'a> DecodeValue<'a> for $ty {
            fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> Result<Self> {
                let oid = Oid::decode_value(reader, header)?;
                Self::try_from(oid).map_err(|_| Tag::ObjectIdentifier.value_error())
            }
        }

        impl EncodeValue for $ty {
            fn value_len(&self) -> Result<Length> {
                Oid::from(*self).value_len()
            }

            fn encode_value(&self, writer: &mut impl Writer) -> Result<()> {
                Oid::from(*self).encode_value(writer)
            }
        }
    };
}

oid_delegated_field!(PaceProtocol);
oid_delegated_field!(ChipAuthenticationProtocol);

// --- Concrete SecurityInfo variants ----------------------------------------

/// ICAO 9303-11 9.2.8 / BSI TR-03110-3 A.1.1.1.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Sequence, ValueOrd)]
pub struct PaceInfo {
    pub protocol:     PaceProtocol,
    pub version:      u64,
    pub parameter_id: Option<u64>,
}

/// BSI TR-03110-3 A.1.1.2. `protocol` here is the cipher-less GM/IM/CAM OID
/// (e.g. `id-PACE-ECDH-GM`), distinct from [`PaceInfo::protocol`].
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Sequence, ValueOrd)]
pub struct PaceDomainParameterInfo {
    pub protocol:        Oid,
    pub domain_parameter: AnyAlgorithmIdentifier,
    pub parameter_id:    Option<u64>,
}

/// ICAO 9303-11 9.2.9 / BSI TR-03110-3 A.1.1.3.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Sequence, ValueOrd)]
pub struct ChipAuthenticationInfo {
    pub protocol: ChipAuthenticationProtocol,
    pub version:  u64,
    pub key_id:   Option<u64>,
}

/// ICAO 9303-11 9.2.10 / BSI TR-03110-3 A.1.1.4.
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Sequence, ValueOrd)]
pub struct ChipAuthenticationPublicKeyInfo {
    pub protocol:                     Oid,
    pub chip_authentication_public_key: SubjectPublicKeyInfo,
    pub key_id:                       Option<u64>,
}

/// BSI TR-03110-3 A.1.1.5. Recognized but out of scope (see spec Non-goals);
/// `efCVCA` (the optional `FileID` pointing at the CVCA certificate chain)
/// is kept as raw `Any` rather than modeled, since Terminal Authentication
/// itself is never driven by this crate.
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Sequence, ValueOrd)]
pub struct TerminalAuthenticationInfo {
    pub protocol: Oid,
    pub version:  u64,
    pub ef_cvca:  Option<Any>,
}

/// ICAO 9303-11 9.2.6. Recognized but out of scope (see spec Non-goals).
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Sequence, ValueOrd)]
pub struct ActiveAuthenticationInfo {
    pub protocol:           Oid,
    pub signature_algorithm: Oid,
}

/// Any `SecurityInfo` whose `protocol` this crate does not recognize at all.
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Sequence, ValueOrd)]
pub struct UnknownSecurityInfo {
    pub protocol:      Oid,
    pub required_data: Any,
    pub optional_data: Option<Any>,
}

// --- The tagged union --------------------------------------------------

#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum SecurityInfo {
    Pace(PaceInfo),
    PaceDomainParameter(PaceDomainParameterInfo),
    ChipAuthentication(ChipAuthenticationInfo),
    ChipAuthenticationPublicKey(ChipAuthenticationPublicKeyInfo),
    TerminalAuthentication(TerminalAuthenticationInfo),
    ActiveAuthentication(ActiveAuthenticationInfo),
    Unknown(UnknownSecurityInfo),
}

/// `EF.CardAccess`/`EF.DG14` are themselves `SecurityInfos ::= SET OF
/// SecurityInfo`, with no further wrapping.
pub type SecurityInfos = OrderedSet<SecurityInfo>;

impl Encode for SecurityInfo {
    fn encoded_len(&self) -> Result<Length> {
        match self {
            Self::Pace(i) => i.encoded_len(),
            Self::PaceDomainParameter(i) => i.encoded_len(),
            Self::ChipAuthentication(i) => i.encoded_len(),
            Self::ChipAuthenticationPublicKey(i) => i.encoded_len(),
            Self::TerminalAuthentication(i) => i.encoded_len(),
            Self::ActiveAuthentication(i) => i.encoded_len(),
            Self::Unknown(i) => i.encoded_len(),
        }
    }

    fn encode(&self, writer: &mut impl Writer) -> Result<()> {
        match self {
            Self::Pace(i) => i.encode(writer),
            Self::PaceDomainParameter(i) => i.encode(writer),
            Self::ChipAuthentication(i) => i.encode(writer),
            Self::ChipAuthenticationPublicKey(i) => i.encode(writer),
            Self::TerminalAuthentication(i) => i.encode(writer),
            Self::ActiveAuthentication(i) => i.encode(writer),
            Self::Unknown(i) => i.encode(writer),
        }
    }
}

impl<'a> Decode<'a> for SecurityInfo {
    fn decode<R: Reader<'a>>(reader: &mut R) -> Result<Self> {
        let any = Any::decode(reader)?;
        let full = any.to_der()?;

        let mut peek = SliceReader::new(any.value())?;
        let oid = Oid::decode(&mut peek)?;

        Ok(if oid == ID_PK_DH || oid == ID_PK_ECDH {
            Self::ChipAuthenticationPublicKey(ChipAuthenticationPublicKeyInfo::from_der(&full)?)
        } else if ChipAuthenticationProtocol::try_from(oid.clone()).is_ok() {
            Self::ChipAuthentication(ChipAuthenticationInfo::from_der(&full)?)
        } else if oid == ID_PACE_DH_GM
            || oid == ID_PACE_ECDH_GM
            || oid == ID_PACE_DH_IM
            || oid == ID_PACE_ECDH_IM
            || oid == ID_PACE_ECDH_CAM
        {
            Self::PaceDomainParameter(PaceDomainParameterInfo::from_der(&full)?)
        } else if PaceProtocol::try_from(oid.clone()).is_ok() {
            Self::Pace(PaceInfo::from_der(&full)?)
        } else if oid == ID_TA {
            Self::TerminalAuthentication(TerminalAuthenticationInfo::from_der(&full)?)
        } else if oid == ID_AA {
            Self::ActiveAuthentication(ActiveAuthenticationInfo::from_der(&full)?)
        } else {
            Self::Unknown(UnknownSecurityInfo::from_der(&full)?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pace_protocol_oid_round_trips() {
        let protocol = PaceProtocol {
            key_agreement: KeyAgreement::Ecdh,
            mapping:        PaceMapping::Generic,
            cipher:         SymmetricCipher::Aes256,
        };
        let oid: Oid = protocol.into();
        assert_eq!(oid, ID_PACE_ECDH_GM_AES_CBC_CMAC_256);
        assert_eq!(PaceProtocol::try_from(oid).unwrap(), protocol);
    }

    #[test]
    fn chip_authentication_protocol_oid_round_trips() {
        let protocol = ChipAuthenticationProtocol {
            key_agreement: KeyAgreement::Dh,
            cipher:         Some(SymmetricCipher::Aes128),
        };
        let oid: Oid = protocol.into();
        assert_eq!(oid, ID_CA_DH_AES_CBC_CMAC_128);
        assert_eq!(ChipAuthenticationProtocol::try_from(oid).unwrap(), protocol);
    }
}
