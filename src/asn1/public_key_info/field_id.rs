//! X9.62 `FieldID`, restricted to the prime fields every ICAO 9303-11
//! standardized EC domain parameter set uses (no binary/characteristic-2
//! fields are defined by the spec's curve table).

use {
    der::{
        asn1::{Int, ObjectIdentifier as Oid},
        Any, Decode, DecodeValue, Encode, EncodeValue, Length, Reader, Result, Sequence, ValueOrd,
        Writer,
    },
    std::cmp::Ordering,
};

pub const ID_PRIME_FIELD: Oid = Oid::new_unwrap("1.2.840.10045.1.1");

#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum FieldId {
    /// `parameters` is the prime modulus `p`.
    Prime(Int),
    Unknown { field_type: Oid, parameters: Any },
}

impl Sequence<'_> for FieldId {}

impl ValueOrd for FieldId {
    fn value_cmp(&self, other: &Self) -> Result<Ordering> {
        let lhs = self.to_der()?;
        let rhs = other.to_der()?;
        Ok(lhs.as_slice().cmp(rhs.as_slice()))
    }
}

impl EncodeValue for FieldId {
    fn value_len(&self) -> Result<Length> {
        match self {
            Self::Prime(p) => ID_PRIME_FIELD.encoded_len()? + p.encoded_len()?,
            Self::Unknown {
                field_type,
                parameters,
            } => field_type.encoded_len()? + parameters.encoded_len()?,
        }
    }

    fn encode_value(&self, writer: &mut impl Writer) -> Result<()> {
        match self {
            Self::Prime(p) => {
                ID_PRIME_FIELD.encode(writer)?;
                p.encode(writer)
            }
            Self::Unknown {
                field_type,
                parameters,
            } => {
                field_type.encode(writer)?;
                parameters.encode(writer)
            }
        }
    }
}

impl<'a> DecodeValue<'a> for FieldId {
    fn decode_value<R: Reader<'a>>(reader: &mut R, _header: der::Header) -> Result<Self> {
        let field_type = Oid::decode(reader)?;
        Ok(match field_type {
            ID_PRIME_FIELD => Self::Prime(Int::decode(reader)?),
            _ => Self::Unknown {
                field_type,
                parameters: Any::decode(reader)?,
            },
        })
    }
}
