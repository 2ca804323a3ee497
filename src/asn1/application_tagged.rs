//! Wraps a DER value that is encoded under an `[APPLICATION N]` constructed
//! tag instead of its natural universal tag, as LDS data group files are
//! (e.g. `EF.SOD` is `[APPLICATION 23]`, `EF.DG14` is `[APPLICATION 14]`).

use der::{DecodeValue, EncodeValue, FixedTag, Header, Length, Reader, Result, Tag, TagNumber, Writer};

#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct ApplicationTagged<const TAG: u16, T>(pub T);

impl<const TAG: u16, T> FixedTag for ApplicationTagged<TAG, T> {
    const TAG: Tag = Tag::Application {
        constructed: true,
        number:      TagNumber::new(TAG),
    };
}

impl<'a, const TAG: u16, T> DecodeValue<'a> for ApplicationTagged<TAG, T>
where
    T: DecodeValue<'a>,
{
    fn decode_value<R: Reader<'a>>(reader: &mut R, header: Header) -> Result<Self> {
        Ok(Self(T::decode_value(reader, header)?))
    }
}

impl<const TAG: u16, T> EncodeValue for ApplicationTagged<TAG, T>
where
    T: EncodeValue,
{
    fn value_len(&self) -> Result<Length> {
        self.0.value_len()
    }

    fn encode_value(&self, writer: &mut impl Writer) -> Result<()> {
        self.0.encode_value(writer)
    }
}
