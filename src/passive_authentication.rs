//! Passive Authentication (ICAO 9303-11 §9.2.11 / 9303-10 §5, spec §4.9):
//! verifies the Document Security Object's CMS signature, then checks that
//! every Data Group actually read hashes to the value the SOD declares for
//! it.

use subtle::ConstantTimeEq;

use crate::{
    asn1::emrtd::EfSod,
    crypto::hash::DigestAlgorithmExt,
    error::{Error, ErrorKind, Result},
    lds::DataGroup,
};

/// Verifies `sod`'s signature, then recomputes and compares the hash of
/// every entry in `data_groups` against the SOD's declared value.
/// `EF.COM`/`EF.SOD` entries in `data_groups` are skipped: they carry no
/// hash entry of their own. Returns `Ok(())` only if the signature and
/// every Data Group's hash check out.
pub fn verify(sod: &EfSod, data_groups: &[DataGroup]) -> Result<()> {
    sod.verify_signature().map_err(|e| ErrorKind::CmsVerificationFailed(e.to_string()))?;

    let lds_security_object = sod
        .lds_security_object()
        .map_err(|e| ErrorKind::Internal(e.to_string()))?;

    for dg in data_groups {
        let Some(dg_number) = dg.dg_number() else {
            continue;
        };
        let expected = lds_security_object
            .hash_for_dg(usize::from(dg_number))
            .ok_or(ErrorKind::UnexpectedStructure("data group hash not found in SOD"))?;
        let actual = lds_security_object.hash_algorithm.hash_bytes(dg.raw());
        if actual.as_slice().ct_eq(expected).unwrap_u8() == 0 {
            return Err(Error::from(ErrorKind::DataGroupHashMismatch(dg_number)));
        }
    }

    Ok(())
}
