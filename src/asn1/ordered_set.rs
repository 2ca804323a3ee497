//! A `SET OF T` that preserves the order its elements were read in.
//!
//! `der`'s own [`SetOfVec`](der::asn1::SetOfVec) transparently re-sorts
//! elements into DER's canonical (encoding-length-then-lexicographic) order
//! on every encode. That's correct strict DER, but real `EF.CardAccess`/
//! `EF.DG14` files are BER `SET OF SecurityInfo` and are not always written
//! in canonical order; re-encoding one through `SetOfVec` would silently
//! reorder it. `OrderedSet` instead accepts any order on decode (which is
//! all BER requires of a `SET OF`) and re-encodes in that same order, so a
//! parsed-then-re-encoded file round-trips byte-for-byte.

use der::{Decode, DecodeValue, Encode, EncodeValue, FixedTag, Header, Length, Reader, Result, Tag};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderedSet<T>(pub Vec<T>);

impl<T> OrderedSet<T> {
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }
}

impl<T> std::ops::Deref for OrderedSet<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<'a, T> IntoIterator for &'a OrderedSet<T> {
    type IntoIter = std::slice::Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T> FixedTag for OrderedSet<T> {
    const TAG: Tag = Tag::Set {
        constructed: true,
    };
}

impl<T> EncodeValue for OrderedSet<T>
where
    T: Encode,
{
    fn value_len(&self) -> Result<Length> {
        self.0.iter().try_fold(Length::ZERO, |acc, item| acc + item.encoded_len()?)
    }

    fn encode_value(&self, writer: &mut impl der::Writer) -> Result<()> {
        for item in &self.0 {
            item.encode(writer)?;
        }
        Ok(())
    }
}

impl<'a, T> DecodeValue<'a> for OrderedSet<T>
where
    T: Decode<'a>,
{
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> Result<Self> {
        reader.read_nested(header.length, |nested| {
            let mut items = Vec::new();
            while !nested.is_finished() {
                items.push(T::decode(nested)?);
            }
            Ok(Self(items))
        })
    }
}
