//! `AlgorithmIdentifier` specialized to the three public-key algorithms the
//! eMRTD protocol stack deals with: RSA (Passive Authentication signer
//! certificates), and DH/EC (PACE and Chip Authentication key agreement).

use {
    super::{DhAlgoParameters, ECAlgoParameters},
    crate::asn1::AnyAlgorithmIdentifier,
    der::{asn1::ObjectIdentifier as Oid, Encode, Result, Sequence, ValueOrd},
    std::cmp::Ordering,
};

pub const ID_RSA: Oid = Oid::new_unwrap("1.2.840.113549.1.1.1");
pub const ID_EC: Oid = Oid::new_unwrap("1.2.840.10045.2.1");
pub const ID_DH: Oid = Oid::new_unwrap("1.2.840.10046.2.1");

#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum PubkeyAlgorithmIdentifier {
    Rsa,
    Ec(ECAlgoParameters),
    Dh(DhAlgoParameters),
    Unknown(AnyAlgorithmIdentifier),
}

impl Sequence<'_> for PubkeyAlgorithmIdentifier {}

impl ValueOrd for PubkeyAlgorithmIdentifier {
    fn value_cmp(&self, other: &Self) -> Result<Ordering> {
        let lhs = self.to_der()?;
        let rhs = other.to_der()?;
        Ok(lhs.as_slice().cmp(rhs.as_slice()))
    }
}

/// Re-derives a typed [`PubkeyAlgorithmIdentifier`] from an already-decoded
/// raw algorithm identifier, without re-parsing the whole SPKI. Used by
/// [`crate::crypto`] to recover DH/EC domain parameters from a
/// `SubjectPublicKeyInfo::Unknown` (the SPKI decoder only special-cases RSA;
/// every other algorithm is kept as its raw `AnyAlgorithmIdentifier`).
impl TryFrom<&AnyAlgorithmIdentifier> for PubkeyAlgorithmIdentifier {
    type Error = der::Error;

    fn try_from(any: &AnyAlgorithmIdentifier) -> Result<Self> {
        Ok(match any.algorithm {
            ID_RSA => Self::Rsa,
            ID_EC => Self::Ec(
                any.parameters
                    .as_ref()
                    .ok_or_else(|| der::Tag::Null.value_error())?
                    .decode_as()?,
            ),
            ID_DH => Self::Dh(
                any.parameters
                    .as_ref()
                    .ok_or_else(|| der::Tag::Null.value_error())?
                    .decode_as()?,
            ),
            _ => Self::Unknown(any.clone()),
        })
    }
}
