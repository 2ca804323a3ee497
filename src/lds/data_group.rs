//! Dispatches a file's outer BER tag (ICAO 9303-10 Table 3) to a typed
//! decoder, or leaves it as an opaque buffer when no further structure is
//! needed. `EF.COM`/`EF.SOD` and `DG14` are the only ones the core looks
//! inside of; the remaining Data Groups are immutable payloads Passive
//! Authentication just hashes. Every variant keeps the original file bytes
//! alongside whatever it decoded, since Passive Authentication hashes the
//! raw encoding, not a re-encoding of the parsed form.

use der::Decode;

use crate::{
    asn1::emrtd::{EfCom, EfDg14, EfSod},
    error::{ErrorKind, Result},
};

/// A Data Group (or `EF.COM`/`EF.SOD`), decoded just enough to do its job.
#[derive(Clone, Debug)]
pub enum DataGroup {
    Com { parsed: EfCom, raw: Vec<u8> },
    Dg14 { parsed: Box<EfDg14>, raw: Vec<u8> },
    Sod { parsed: Box<EfSod>, raw: Vec<u8> },
    /// A Data Group this crate does not parse further.
    Other { tag: u8, raw: Vec<u8> },
}

impl DataGroup {
    /// Decodes `raw`, the complete file bytes including the outer tag,
    /// dispatching on that tag.
    pub fn decode(raw: Vec<u8>) -> Result<Self> {
        let tag = *raw.first().ok_or(ErrorKind::TruncatedField)?;
        Ok(match tag {
            EfCom::TAG => DataGroup::Com {
                parsed: EfCom::from_bytes(&raw)?,
                raw,
            },
            DG14_TAG => DataGroup::Dg14 {
                parsed: Box::new(EfDg14::from_der(&raw).map_err(|e| ErrorKind::Internal(e.to_string()))?),
                raw,
            },
            SOD_TAG => DataGroup::Sod {
                parsed: Box::new(EfSod::from_der(&raw).map_err(|e| ErrorKind::Internal(e.to_string()))?),
                raw,
            },
            _ => DataGroup::Other { tag, raw },
        })
    }

    /// The outer tag this Data Group was read under.
    #[must_use]
    pub fn tag(&self) -> u8 {
        match self {
            DataGroup::Com { .. } => EfCom::TAG,
            DataGroup::Dg14 { .. } => DG14_TAG,
            DataGroup::Sod { .. } => SOD_TAG,
            DataGroup::Other { tag, .. } => *tag,
        }
    }

    /// The raw file bytes (outer tag included), the input to Passive
    /// Authentication's per-DG hash check.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        match self {
            DataGroup::Com { raw, .. }
            | DataGroup::Dg14 { raw, .. }
            | DataGroup::Sod { raw, .. }
            | DataGroup::Other { raw, .. } => raw,
        }
    }

    /// This Data Group's ICAO number, or `None` for `EF.COM`/`EF.SOD`.
    #[must_use]
    pub fn dg_number(&self) -> Option<u8> {
        dg_number_for_tag(self.tag())
    }
}

/// `EF.DG14`'s outer tag, `[APPLICATION 14]` constructed.
pub const DG14_TAG: u8 = 0x6E;
/// `EF.SOD`'s outer tag, `[APPLICATION 23]` constructed.
pub const SOD_TAG: u8 = 0x77;

/// Maps a Data Group's outer BER tag to its ICAO Data Group number, per
/// ICAO 9303-10 Table 3. Returns `None` for `EF.COM`/`EF.SOD`, which are
/// not numbered Data Groups.
#[must_use]
pub fn dg_number_for_tag(tag: u8) -> Option<u8> {
    match tag {
        0x61 => Some(1),
        0x75 => Some(2),
        0x63 => Some(3),
        0x76 => Some(4),
        0x65 => Some(5),
        0x66 => Some(6),
        0x67 => Some(7),
        0x68 => Some(8),
        0x69 => Some(9),
        0x6A => Some(10),
        0x6B => Some(11),
        0x6C => Some(12),
        0x6D => Some(13),
        DG14_TAG => Some(14),
        0x6F => Some(15),
        0x70 => Some(16),
        _ => None,
    }
}

/// The short EF identifier for the numbered Data Group `n` (`01 0n`), per
/// ICAO 9303-10 §4.7.
#[must_use]
pub fn short_ef_id_for_dg(n: u8) -> [u8; 2] {
    [0x01, n]
}

/// The inverse of [`dg_number_for_tag`]: the outer BER tag a numbered Data
/// Group is read under. Panics outside `1..=16`; callers only ever call
/// this with a tag taken from `EF.COM`'s Data Group list or a DG number the
/// caller itself chose to read.
#[must_use]
pub fn tag_for_dg_number(n: u8) -> u8 {
    match n {
        1 => 0x61,
        2 => 0x75,
        3 => 0x63,
        4 => 0x76,
        5 => 0x65,
        6 => 0x66,
        7 => 0x67,
        8 => 0x68,
        9 => 0x69,
        10 => 0x6A,
        11 => 0x6B,
        12 => 0x6C,
        13 => 0x6D,
        14 => DG14_TAG,
        15 => 0x6F,
        16 => 0x70,
        other => panic!("not a valid ICAO Data Group number: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_tags_to_dg_numbers() {
        assert_eq!(dg_number_for_tag(0x61), Some(1));
        assert_eq!(dg_number_for_tag(0x6E), Some(14));
        assert_eq!(dg_number_for_tag(0x70), Some(16));
        assert_eq!(dg_number_for_tag(0x60), None);
        assert_eq!(dg_number_for_tag(0x77), None);
    }

    #[test]
    fn tag_for_dg_number_round_trips_with_dg_number_for_tag() {
        for n in 1..=16u8 {
            assert_eq!(dg_number_for_tag(tag_for_dg_number(n)), Some(n));
        }
    }

    #[test]
    fn decode_dispatches_com_by_outer_tag() {
        let lds_version = [0x5F, 0x01, 0x04, b'0', b'1', b'0', b'7'];
        let unicode_version = [0x5F, 0x36, 0x06, b'0', b'6', b'0', b'1', b'1', b'0'];
        let tag_list = [0x5C, 0x01, 0x61];
        let mut value = Vec::new();
        value.extend_from_slice(&lds_version);
        value.extend_from_slice(&unicode_version);
        value.extend_from_slice(&tag_list);
        let mut raw = vec![0x60, value.len() as u8];
        raw.extend_from_slice(&value);
        let expected = raw.clone();

        match DataGroup::decode(raw).unwrap() {
            DataGroup::Com { parsed, raw } => {
                assert_eq!(parsed.data_group_tags, vec![0x61]);
                assert_eq!(raw, expected);
            }
            other => panic!("expected DataGroup::Com, got {other:?}"),
        }
    }

    #[test]
    fn decode_leaves_unrecognized_tags_opaque() {
        let raw = vec![0x61, 0x02, 0xAA, 0xBB];
        match DataGroup::decode(raw.clone()).unwrap() {
            DataGroup::Other { tag, raw: got } => {
                assert_eq!(tag, 0x61);
                assert_eq!(got, raw);
            }
            other => panic!("expected DataGroup::Other, got {other:?}"),
        }
    }

    #[test]
    fn dg_number_reflects_decoded_tag() {
        let raw = vec![0x61, 0x02, 0xAA, 0xBB];
        let dg = DataGroup::decode(raw).unwrap();
        assert_eq!(dg.dg_number(), Some(1));
    }
}
