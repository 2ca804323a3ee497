//! The Logical Data Structure file reader (ICAO 9303-10 §4, spec §4.7-4.8):
//! `SELECT`/`READ BINARY` sequencing over the NFC transport, and decoding
//! of the files it reads into typed or opaque [`DataGroup`]s.

pub mod data_group;
pub mod file_reader;

pub use data_group::{dg_number_for_tag, tag_for_dg_number, DataGroup};
pub use file_reader::{read_file, Channel};

use crate::iso7816::apdu::EF_CARD_ACCESS;

/// A file this crate selects and reads directly.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FileId {
    CardAccess,
    Com,
    Sod,
    DataGroup(u8),
}

impl FileId {
    /// The 2-byte short EF identifier `SELECT EF` expects, per ICAO 9303-10
    /// §4.7.
    #[must_use]
    pub fn short_ef_id(self) -> [u8; 2] {
        match self {
            FileId::CardAccess => EF_CARD_ACCESS,
            FileId::Com => [0x01, 0x1E],
            FileId::Sod => [0x01, 0x1D],
            FileId::DataGroup(n) => data_group::short_ef_id_for_dg(n),
        }
    }

    /// The outer BER tag reported via [`crate::nfc::Stage::Reading`] while
    /// this file is being read.
    #[must_use]
    pub fn progress_tag(self) -> u8 {
        match self {
            FileId::CardAccess => 0x1C,
            FileId::Com => crate::asn1::emrtd::EfCom::TAG,
            FileId::Sod => data_group::SOD_TAG,
            FileId::DataGroup(n) => tag_for_dg_number(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_ef_ids_match_icao_table() {
        assert_eq!(FileId::CardAccess.short_ef_id(), [0x01, 0x1C]);
        assert_eq!(FileId::Com.short_ef_id(), [0x01, 0x1E]);
        assert_eq!(FileId::Sod.short_ef_id(), [0x01, 0x1D]);
        assert_eq!(FileId::DataGroup(1).short_ef_id(), [0x01, 0x01]);
        assert_eq!(FileId::DataGroup(14).short_ef_id(), [0x01, 0x0E]);
    }
}
