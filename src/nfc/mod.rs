//! The external collaborators this crate needs but does not implement
//! itself (spec §1, §6): the NFC transport and host progress/display
//! callbacks. Both are minimal trait contracts; concrete transports (a
//! PC/SC reader, a phone's NFC stack, a Proxmark3) live outside this crate.

use crate::{error::ErrorKind, iso7816::StatusWord, Result};

#[cfg(feature = "proxmark3")]
pub mod proxmark3;

/// One ISO/IEC 7816-4 command/response exchange with the IC, carried over
/// ISO/IEC 14443 NFC. The core supplies fully-formed APDU bytes (short or
/// extended form) and expects the raw response data plus status word
/// bytes back.
pub trait Transport {
    /// Sends `command` (complete APDU bytes) and returns `(response data,
    /// SW1, SW2)`. A transport-level failure (session dropped, user
    /// cancelled the scan) should return an [`crate::error::Error`] built
    /// from [`ErrorKind::ConnectionLost`] or [`ErrorKind::UserCancelled`].
    fn send(&mut self, command: &[u8]) -> Result<(Vec<u8>, u8, u8)>;
}

/// Convenience on top of [`Transport`]: bundles the response data with its
/// status word and checks transport-level validity.
pub fn exchange(transport: &mut dyn Transport, command: &[u8]) -> Result<(Vec<u8>, StatusWord)> {
    let (data, sw1, sw2) = transport.send(command)?;
    let sw = StatusWord::from(u16::from_be_bytes([sw1, sw2]));
    if !sw.is_valid() {
        return Err(ErrorKind::ConnectionLost.into());
    }
    Ok((data, sw))
}

/// A stage of the read, reported via [`ProgressCallback::on_stage`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Stage {
    /// Waiting for the user to present the document to the reader.
    RequestPresent,
    /// Running access control / chip authentication.
    Authenticating,
    /// Reading a Data Group; `percent` is 0..=100.
    Reading { dg_tag: u8, percent: u8 },
    /// The read completed (Passive Authentication may still have failed;
    /// see the returned status record).
    Success,
    /// The read aborted with the given error kind.
    Error(ErrorKind),
}

/// Host-facing progress and display hooks. Rendering is out of scope;
/// implementations typically update a progress bar or log.
pub trait ProgressCallback {
    /// Called as a Data Group's bytes arrive, with `percent` in `0..=100`.
    fn on_dg_progress(&mut self, dg_tag: u8, percent: u8) {
        let _ = (dg_tag, percent);
    }

    /// Called on every stage transition.
    fn on_stage(&mut self, stage: Stage) {
        let _ = stage;
    }
}

/// A [`ProgressCallback`] that does nothing, for callers that don't need
/// progress reporting.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressCallback for NoProgress {}
