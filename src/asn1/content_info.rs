//! RFC 5652 `ContentInfo`, specialized so the encapsulated `content` field
//! decodes straight into a concrete Rust type rather than staying an opaque
//! `Any`, once its `contentType` OID is known (see [`ContentType`]).

use {
    der::{
        asn1::{ContextSpecific, ObjectIdentifier as Oid},
        Decode, DecodeValue, Encode, EncodeValue, Length, Reader, Result, Sequence, TagMode,
        TagNumber, ValueOrd, Writer,
    },
    std::cmp::Ordering,
};

/// Marks a Rust type as the payload of a `ContentInfo`/`EncapsulatedContentInfo`,
/// keyed on the `contentType` OID that identifies it on the wire.
pub trait ContentType {
    const CONTENT_TYPE: Oid;
}

/// `ContentInfo ::= SEQUENCE { contentType OBJECT IDENTIFIER, content [0]
/// EXPLICIT ANY DEFINED BY contentType }`, with `content` decoded as `T`.
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct ContentInfo<T>(pub T);

impl<T> Sequence<'_> for ContentInfo<T> where T: ContentType + Encode + for<'a> Decode<'a> {}

impl<T> ValueOrd for ContentInfo<T>
where
    T: ContentType + Encode + for<'a> Decode<'a>,
{
    fn value_cmp(&self, other: &Self) -> Result<Ordering> {
        let lhs = self.to_der()?;
        let rhs = other.to_der()?;
        Ok(lhs.as_slice().cmp(rhs.as_slice()))
    }
}

impl<T> EncodeValue for ContentInfo<T>
where
    T: ContentType + Encode,
{
    fn value_len(&self) -> Result<Length> {
        let content = ContextSpecific {
            tag_number: TagNumber::N0,
            tag_mode:   TagMode::Explicit,
            value:      &self.0,
        };
        T::CONTENT_TYPE.encoded_len()? + content.encoded_len()?
    }

    fn encode_value(&self, writer: &mut impl Writer) -> Result<()> {
        T::CONTENT_TYPE.encode(writer)?;
        let content = ContextSpecific {
            tag_number: TagNumber::N0,
            tag_mode:   TagMode::Explicit,
            value:      &self.0,
        };
        content.encode(writer)
    }
}

impl<'a, T> DecodeValue<'a> for ContentInfo<T>
where
    T: ContentType + Decode<'a>,
{
    fn decode_value<R: Reader<'a>>(reader: &mut R, _header: der::Header) -> Result<Self> {
        let content_type = Oid::decode(reader)?;
        let content = ContextSpecific::<T>::decode_explicit(reader, TagNumber::N0)?
            .ok_or_else(|| der::Tag::ContextSpecific {
                constructed: true,
                number:      TagNumber::N0,
            }
            .value_error())?
            .value;
        Ok(Self(content))
    }
}
