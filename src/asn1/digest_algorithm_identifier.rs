//! A `DigestAlgorithmIdentifier` (`AlgorithmIdentifier` specialized to the
//! hash OIDs this crate needs to recognize for Passive Authentication and
//! LDS Security Object hashing), keeping track of which of the two
//! equally-legal ways implementations encode "no parameters" was actually
//! used, so re-encoding round-trips exactly.

use {
    super::AnyAlgorithmIdentifier,
    der::{
        asn1::{Null, ObjectIdentifier as Oid},
        Decode, DecodeValue, Encode, EncodeValue, Length, Reader, Result, Sequence, ValueOrd,
        Writer,
    },
    std::cmp::Ordering,
};

pub const ID_SHA1: Oid = Oid::new_unwrap("1.3.14.3.2.26");
pub const ID_SHA224: Oid = Oid::new_unwrap("2.16.840.1.101.3.4.2.4");
pub const ID_SHA256: Oid = Oid::new_unwrap("2.16.840.1.101.3.4.2.1");
pub const ID_SHA384: Oid = Oid::new_unwrap("2.16.840.1.101.3.4.2.2");
pub const ID_SHA512: Oid = Oid::new_unwrap("2.16.840.1.101.3.4.2.3");

/// How "no parameters" was actually encoded: some issuers omit the field
/// entirely, others write an explicit DER `NULL`. Both are legal per RFC
/// 5280's `AlgorithmIdentifier` note; keeping track of which one a given
/// card used lets us reconstruct its SOD byte-for-byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum Parameters {
    Absent,
    Null,
}

/// A digest algorithm, per ICAO 9303-11 the only kind of
/// `AlgorithmIdentifier` this crate needs to resolve to an actual hash
/// function (SOD digest algorithm, LDS Security Object `hashAlgorithm`).
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct DigestAlgorithmIdentifier {
    pub algorithm:  Oid,
    pub parameters: Parameters,
}

/// The digest algorithms this crate can evaluate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HashAlgorithm {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithmIdentifier {
    /// Resolves the OID to a concrete hash function, if recognized.
    #[must_use]
    pub fn hash_algorithm(&self) -> Option<HashAlgorithm> {
        match self.algorithm {
            ID_SHA1 => Some(HashAlgorithm::Sha1),
            ID_SHA224 => Some(HashAlgorithm::Sha224),
            ID_SHA256 => Some(HashAlgorithm::Sha256),
            ID_SHA384 => Some(HashAlgorithm::Sha384),
            ID_SHA512 => Some(HashAlgorithm::Sha512),
            _ => None,
        }
    }
}

impl TryFrom<&AnyAlgorithmIdentifier> for DigestAlgorithmIdentifier {
    type Error = der::Error;

    /// Narrows a generic `AlgorithmIdentifier` (as found e.g. inside an
    /// RSASSA-PSS `maskGenAlgorithm`'s parameters, or a PSS
    /// `hashAlgorithm` field) to a `DigestAlgorithmIdentifier`.
    fn try_from(any: &AnyAlgorithmIdentifier) -> std::result::Result<Self, Self::Error> {
        let parameters = if any.parameters.is_some() {
            Parameters::Null
        } else {
            Parameters::Absent
        };
        Ok(Self {
            algorithm: any.algorithm,
            parameters,
        })
    }
}

impl Sequence<'_> for DigestAlgorithmIdentifier {}

impl ValueOrd for DigestAlgorithmIdentifier {
    fn value_cmp(&self, other: &Self) -> Result<Ordering> {
        let lhs = self.to_der()?;
        let rhs = other.to_der()?;
        Ok(lhs.as_slice().cmp(rhs.as_slice()))
    }
}

impl EncodeValue for DigestAlgorithmIdentifier {
    fn value_len(&self) -> Result<Length> {
        let params_len = match self.parameters {
            Parameters::Absent => Length::ZERO,
            Parameters::Null => Null.encoded_len()?,
        };
        self.algorithm.encoded_len()? + params_len
    }

    fn encode_value(&self, writer: &mut impl Writer) -> Result<()> {
        self.algorithm.encode(writer)?;
        if let Parameters::Null = self.parameters {
            Null.encode(writer)?;
        }
        Ok(())
    }
}

impl<'a> DecodeValue<'a> for DigestAlgorithmIdentifier {
    fn decode_value<R: Reader<'a>>(reader: &mut R, _header: der::Header) -> Result<Self> {
        let algorithm = Oid::decode(reader)?;
        let parameters = if reader.remaining_len() > Length::ZERO {
            Null::decode(reader)?;
            Parameters::Null
        } else {
            Parameters::Absent
        };
        Ok(Self {
            algorithm,
            parameters,
        })
    }
}
