//! The top-level read sequence (spec §4.10): access control, application
//! selection, Chip Authentication, every advertised Data Group, then
//! Passive Authentication — threading the Secure Messaging channel through
//! each stage (re-keying it whenever Chip Authentication succeeds) and
//! applying the per-Data-Group remediation table from spec §7 on read
//! errors.

use der::Decode;

use crate::{
    access_control::{bac, pace},
    asn1::emrtd::{
        security_info::{PaceInfo, SecurityInfo},
        EfCardAccess, EfCom, EfDg14, EfSod,
    },
    chip_authentication,
    crypto::CryptoCoreRng,
    error::{Error, ErrorKind, Result},
    iso7816::{
        apdu::{select_aid, select_master_file, EMRTD_AID},
        StatusWord,
    },
    lds::{self, Channel, DataGroup, FileId},
    nfc::{exchange, ProgressCallback, Stage, Transport},
    passive_authentication,
    secure_messaging::SessionKeys,
};

/// Whether an access-control or verification stage succeeded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    Success,
    Failed,
}

/// The `Terminal` state of spec §4.10: every status the read sequence
/// tracked, the parsed `EF.COM`, and every Data Group actually read.
#[derive(Clone, Debug, Default)]
pub struct ReadResult {
    /// `None` if PACE was never attempted (no `EF.CardAccess`, or no
    /// `PaceInfo` in it).
    pub pace: Option<Outcome>,
    /// `None` only if PACE succeeded and BAC was never needed.
    pub bac: Option<Outcome>,
    /// `None` if `DG14` was absent or carried no usable Chip
    /// Authentication key.
    pub chip_authentication: Option<Outcome>,
    pub passive_authentication: Option<Outcome>,
    pub com: Option<EfCom>,
    pub data_groups: Vec<DataGroup>,
}

/// Runs the full read sequence against `transport`, using `mrz_key` (see
/// [`crate::mrz::derive_mrz_key`]) for access control. `transport` must
/// already be connected to a presented chip: this function does not wait
/// for one to appear (see [`Stage::RequestPresent`]).
pub fn run(
    transport: &mut dyn Transport,
    mrz_key: &str,
    rng: &mut dyn CryptoCoreRng,
    progress: &mut dyn ProgressCallback,
) -> Result<ReadResult> {
    progress.on_stage(Stage::Authenticating);
    let mut result = ReadResult::default();

    let outcome = establish_channel(transport, mrz_key, rng, progress, &mut result);
    let mut channel = report_error(progress, outcome)?;

    let com_raw = report_error(
        progress,
        lds::read_file(transport, &mut Channel::Protected(&mut channel), FileId::Com, progress),
    )?;
    let com = report_error(progress, EfCom::from_bytes(&com_raw))?;

    if com.data_group_tags.contains(&lds::tag_for_dg_number(14)) {
        match read_dg14_and_authenticate(transport, &mut channel, mrz_key, rng, progress) {
            Ok(Some((dg14, Some(rekeyed)))) => {
                result.chip_authentication = Some(Outcome::Success);
                result.data_groups.push(dg14);
                channel = rekeyed;
            }
            Ok(Some((dg14, None))) => {
                result.chip_authentication = Some(Outcome::Failed);
                result.data_groups.push(dg14);
                channel = report_error(progress, bac::run(transport, mrz_key, rng))?;
                result.bac = Some(Outcome::Success);
            }
            Ok(None) => {} // chip advertised DG14 but the read itself failed recoverably; skip it.
            Err(e) => return fail(progress, e),
        }
    }

    for &tag in &com.data_group_tags {
        let Some(dg_number) = lds::dg_number_for_tag(tag) else { continue };
        if result.data_groups.iter().any(|dg| dg.dg_number() == Some(dg_number)) {
            continue; // DG14 already read above while attempting Chip Authentication.
        }
        let ca_done = result.chip_authentication == Some(Outcome::Success);
        match read_dg_with_remediation(transport, &mut channel, mrz_key, rng, dg_number, ca_done, progress) {
            Ok(Some(dg)) => result.data_groups.push(dg),
            Ok(None) => {}
            Err(e) => return fail(progress, e),
        }
    }

    let sod_raw = report_error(
        progress,
        lds::read_file(transport, &mut Channel::Protected(&mut channel), FileId::Sod, progress),
    )?;
    let sod = report_error(progress, decode_sod(sod_raw))?;

    result.passive_authentication = Some(match passive_authentication::verify(&sod, &result.data_groups) {
        Ok(()) => Outcome::Success,
        Err(_) => Outcome::Failed,
    });
    result.com = Some(com);

    progress.on_stage(Stage::Success);
    Ok(result)
}

fn decode_sod(raw: Vec<u8>) -> Result<Box<EfSod>> {
    match DataGroup::decode(raw)? {
        DataGroup::Sod { parsed, .. } => Ok(parsed),
        _ => Err(ErrorKind::UnexpectedStructure("EF.SOD's outer tag did not decode as EF.SOD").into()),
    }
}

/// `Discovered` through `SecureA`/`AppSelected`: read `EF.CardAccess` and
/// try PACE; if that is not possible or fails, select the passport
/// application and run BAC instead.
fn establish_channel(
    transport: &mut dyn Transport,
    mrz_key: &str,
    rng: &mut dyn CryptoCoreRng,
    progress: &mut dyn ProgressCallback,
    result: &mut ReadResult,
) -> Result<SessionKeys> {
    match read_pace_info(transport, progress) {
        Some(pace_info) => match pace::run(transport, &pace_info, mrz_key, rng) {
            Ok(keys) => {
                result.pace = Some(Outcome::Success);
                let (_, sw) = exchange(transport, &select_aid(&EMRTD_AID))?;
                check_sw(sw)?;
                Ok(keys)
            }
            Err(_) => {
                result.pace = Some(Outcome::Failed);
                run_bac(transport, mrz_key, rng, result)
            }
        },
        None => run_bac(transport, mrz_key, rng, result),
    }
}

/// Selects the passport application and runs BAC. The `EF.CardAccess`
/// read (if attempted) left the chip's current DF at the master file, so
/// the application needs reselecting before BAC's `GET CHALLENGE` will
/// work; a BAC rerun after a mid-read Chip Authentication failure, or as
/// the per-Data-Group remediation retry, never leaves the application and
/// calls `bac::run` directly instead of going through here.
fn run_bac(
    transport: &mut dyn Transport,
    mrz_key: &str,
    rng: &mut dyn CryptoCoreRng,
    result: &mut ReadResult,
) -> Result<SessionKeys> {
    let (_, sw) = exchange(transport, &select_aid(&EMRTD_AID))?;
    check_sw(sw)?;
    match bac::run(transport, mrz_key, rng) {
        Ok(keys) => {
            result.bac = Some(Outcome::Success);
            Ok(keys)
        }
        Err(e) => {
            result.bac = Some(Outcome::Failed);
            Err(e)
        }
    }
}

/// Reads `EF.CardAccess` (via the master file, since it lives outside the
/// passport application) and returns its `PaceInfo`, if both the file and
/// a usable security info are present. Any failure along the way (no
/// `EF.CardAccess`, undecodable content, no PACE advertised) is treated as
/// "PACE unavailable" rather than surfaced, per spec §4.10.
fn read_pace_info(transport: &mut dyn Transport, progress: &mut dyn ProgressCallback) -> Option<PaceInfo> {
    exchange(transport, &select_master_file()).ok()?;
    let raw = lds::read_file(transport, &mut Channel::Plain, FileId::CardAccess, progress).ok()?;
    let card_access = EfCardAccess::from_der(&raw).ok()?;
    card_access.iter().find_map(|security_info| match security_info {
        SecurityInfo::Pace(info) => Some(*info),
        _ => None,
    })
}

/// `COMRead` → Chip Authentication: reads `DG14` like any other Data Group
/// (through the same remediation table, so a chip that advertises DG14 but
/// refuses or fails the read is skipped rather than aborting the whole
/// read), and, if it carries a usable Chip Authentication key, runs Chip
/// Authentication against it. Returns `None` only if the `DG14` read itself
/// was skipped per the remediation table; otherwise the decoded `DG14`
/// (Passive Authentication still needs to hash it even if Chip
/// Authentication fails) plus the re-keyed channel if Chip Authentication
/// succeeded.
fn read_dg14_and_authenticate(
    transport: &mut dyn Transport,
    channel: &mut SessionKeys,
    mrz_key: &str,
    rng: &mut dyn CryptoCoreRng,
    progress: &mut dyn ProgressCallback,
) -> Result<Option<(DataGroup, Option<SessionKeys>)>> {
    let Some(dg14) = read_dg_with_remediation(transport, channel, mrz_key, rng, 14, false, progress)? else {
        return Ok(None);
    };
    let DataGroup::Dg14 { parsed, .. } = &dg14 else {
        return Err(ErrorKind::UnexpectedStructure("DG14's outer tag did not decode as DG14").into());
    };
    let rekeyed = dg14_chip_authentication(transport, channel, parsed, rng);
    Ok(Some((dg14, rekeyed)))
}

fn dg14_chip_authentication(
    transport: &mut dyn Transport,
    channel: &mut SessionKeys,
    dg14: &EfDg14,
    rng: &mut dyn CryptoCoreRng,
) -> Option<SessionKeys> {
    let (ca_info, static_key_info) = dg14.chip_authentication()?;
    chip_authentication::run(transport, channel, &ca_info, static_key_info, rng).ok()
}

/// How a failed Data Group read should be recovered from, per spec §7's
/// per-Data-Group remediation table.
enum Remediation {
    Skip,
    ReBacAndRetry,
    Surface,
}

fn remediation_for(sw: StatusWord, ca_done: bool) -> Remediation {
    match sw {
        _ if sw.sw1() == 0x6C => Remediation::ReBacAndRetry, // wrong length
        _ if u16::from(sw) == 0x6E00 && ca_done => Remediation::ReBacAndRetry, // class not supported
        StatusWord::ACCESS_DENIED => Remediation::Skip, // security status not satisfied
        StatusWord::FILE_NOT_FOUND => Remediation::Skip,
        StatusWord::SECURE_MESSAGING_INCORRECT => Remediation::ReBacAndRetry,
        _ if u16::from(sw) == 0x6282 => Remediation::ReBacAndRetry, // end of file reached
        _ => Remediation::Surface,
    }
}

/// `SecureA | SecureB`'s per-Data-Group read, with up to one retry
/// following the remediation table: a re-BAC on a Secure-Messaging or
/// wrong-length class of error, a silent skip when the chip has simply
/// refused or doesn't have the file, and surfacing anything else.
fn read_dg_with_remediation(
    transport: &mut dyn Transport,
    channel: &mut SessionKeys,
    mrz_key: &str,
    rng: &mut dyn CryptoCoreRng,
    dg_number: u8,
    ca_done: bool,
    progress: &mut dyn ProgressCallback,
) -> Result<Option<DataGroup>> {
    let mut attempts = 0u8;
    loop {
        attempts += 1;
        let outcome = lds::read_file(transport, &mut Channel::Protected(channel), FileId::DataGroup(dg_number), progress);
        match outcome {
            Ok(raw) => return Ok(Some(DataGroup::decode(raw)?)),
            Err(e) => {
                let sw = match &e.kind {
                    ErrorKind::Apdu(sw) => *sw,
                    _ => return Err(e),
                };
                match remediation_for(sw, ca_done) {
                    Remediation::Skip => return Ok(None),
                    Remediation::ReBacAndRetry if attempts < 2 => {
                        *channel = bac::run(transport, mrz_key, rng)?;
                        continue;
                    }
                    _ => return Err(e),
                }
            }
        }
    }
}

fn check_sw(sw: StatusWord) -> Result<()> {
    if sw.is_success() {
        Ok(())
    } else {
        Err(ErrorKind::Apdu(sw).into())
    }
}

fn report_error<T>(progress: &mut dyn ProgressCallback, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        progress.on_stage(Stage::Error(e.kind.clone()));
    }
    result
}

fn fail<T>(progress: &mut dyn ProgressCallback, e: Error) -> Result<T> {
    progress.on_stage(Stage::Error(e.kind.clone()));
    Err(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_length_retries_with_a_re_bac() {
        let sw = StatusWord::from(0x6C10u16);
        assert!(matches!(remediation_for(sw, false), Remediation::ReBacAndRetry));
    }

    #[test]
    fn class_not_supported_only_retries_after_chip_authentication() {
        let sw = StatusWord::from(0x6E00u16);
        assert!(matches!(remediation_for(sw, true), Remediation::ReBacAndRetry));
        assert!(matches!(remediation_for(sw, false), Remediation::Surface));
    }

    #[test]
    fn access_denied_and_file_not_found_skip_the_data_group() {
        assert!(matches!(remediation_for(StatusWord::ACCESS_DENIED, false), Remediation::Skip));
        assert!(matches!(remediation_for(StatusWord::FILE_NOT_FOUND, false), Remediation::Skip));
    }

    #[test]
    fn incorrect_secure_messaging_data_retries_with_a_re_bac() {
        assert!(matches!(
            remediation_for(StatusWord::SECURE_MESSAGING_INCORRECT, false),
            Remediation::ReBacAndRetry
        ));
    }

    #[test]
    fn end_of_file_reached_retries_with_a_re_bac() {
        let sw = StatusWord::from(0x6282u16);
        assert!(matches!(remediation_for(sw, false), Remediation::ReBacAndRetry));
    }

    #[test]
    fn anything_else_surfaces() {
        let sw = StatusWord::from(0x6400u16);
        assert!(matches!(remediation_for(sw, true), Remediation::Surface));
    }
}
