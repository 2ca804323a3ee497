//! EF.COM (ICAO 9303-10 §4.6.1): the LDS and Unicode version strings and
//! the list of Data Group short-EF tags the chip claims to hold, read
//! before deciding which Data Groups to fetch. Not CMS- or `der`-Sequence
//! shaped like the other LDS files (its fields are `[APPLICATION n]`
//! primitives in a fixed, non-minimal BER tag form), so it is decoded
//! against the generic [`crate::asn1::ber`] tree instead.

use crate::{
    asn1::ber::{Tag, Tree},
    error::{ErrorKind, Result},
};

/// A decoded `EF.COM`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EfCom {
    pub lds_version:     String,
    pub unicode_version: String,
    /// The raw short-EF tag of every Data Group the chip claims to carry
    /// (e.g. `0x61` for DG1), taken verbatim from the `5C` tag list.
    pub data_group_tags: Vec<u8>,
}

impl EfCom {
    /// `EF.COM`'s outer tag, `[APPLICATION 0]` constructed.
    pub const TAG: u8 = 0x60;

    /// Decodes `raw`, the whole `EF.COM` file including its outer tag.
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let tree = Tree::parse(raw)?;
        let root = tree.root();
        if root.tag != Tag::application(true, 0) {
            return Err(ErrorKind::UnexpectedStructure("EF.COM missing outer [APPLICATION 0] tag").into());
        }

        let lds_version = tree
            .first_child_with_tag(root, Tag::application(false, 0x01))
            .ok_or(ErrorKind::UnexpectedStructure("EF.COM missing LDS version"))?;
        let unicode_version = tree
            .first_child_with_tag(root, Tag::application(false, 0x36))
            .ok_or(ErrorKind::UnexpectedStructure("EF.COM missing Unicode version"))?;
        let tag_list = tree
            .first_child_with_tag(root, Tag::application(false, 0x1C))
            .ok_or(ErrorKind::UnexpectedStructure("EF.COM missing Data Group tag list"))?;

        Ok(Self {
            lds_version: printable_string(tree.value(lds_version))?,
            unicode_version: printable_string(tree.value(unicode_version))?,
            data_group_tags: tree.value(tag_list).to_vec(),
        })
    }
}

fn printable_string(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| ErrorKind::UnexpectedStructure("EF.COM version field is not valid text").into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        let lds_version = [0x5F, 0x01, 0x04, b'0', b'1', b'0', b'7'];
        let unicode_version = [0x5F, 0x36, 0x06, b'0', b'6', b'0', b'1', b'1', b'0'];
        let tag_list = [0x5C, 0x03, 0x61, 0x75, 0x6E];
        let mut value = Vec::new();
        value.extend_from_slice(&lds_version);
        value.extend_from_slice(&unicode_version);
        value.extend_from_slice(&tag_list);
        let mut file = vec![0x60, value.len() as u8];
        file.extend_from_slice(&value);
        file
    }

    #[test]
    fn decodes_version_strings_and_tag_list() {
        let com = EfCom::from_bytes(&sample()).unwrap();
        assert_eq!(com.lds_version, "0107");
        assert_eq!(com.unicode_version, "060110");
        assert_eq!(com.data_group_tags, vec![0x61, 0x75, 0x6E]);
    }

    #[test]
    fn rejects_wrong_outer_tag() {
        let mut file = sample();
        file[0] = 0x61;
        assert!(EfCom::from_bytes(&file).is_err());
    }
}
