//! Adaptive `SELECT EF` + `READ BINARY` (spec §4.7): selects a file by its
//! short EF id, reads a small header to discover the outer BER-TLV's
//! declared length, then reads the rest in chunks, shrinking the chunk
//! size on a chip-reported wrong-length error.

use crate::{
    error::{ErrorKind, Result},
    iso7816::{
        apdu::{read_binary, select_ef},
        StatusWord,
    },
    nfc::{exchange, ProgressCallback, Stage, Transport},
    secure_messaging::SessionKeys,
};

use super::FileId;

/// Default `READ BINARY` chunk size, per spec §4.7.
pub const DEFAULT_CHUNK: u8 = 160;

/// Enough bytes to cover a BER tag plus the longest length field this
/// implementation supports (1-byte count + up to 4 length bytes).
const HEADER_PROBE: u8 = 6;

/// Whether file reads go out in the clear (before any channel exists, for
/// `EF.CardAccess`) or through an established Secure Messaging channel.
pub enum Channel<'a> {
    Plain,
    Protected(&'a mut SessionKeys),
}

impl Channel<'_> {
    fn exchange(&mut self, transport: &mut dyn Transport, command: &[u8]) -> Result<(Vec<u8>, StatusWord)> {
        match self {
            Channel::Plain => exchange(transport, command),
            Channel::Protected(session) => {
                let protected = session.protect(command)?;
                let (data, sw) = exchange(transport, &protected)?;
                session.unprotect(&data, sw)
            }
        }
    }
}

/// Selects `file` and reads it to completion, reporting progress via
/// `progress` (`dg_tag` is `file`'s short EF tag byte for Data Groups, or
/// its `EfCom`/`EfSod` outer tag).
pub fn read_file(
    transport: &mut dyn Transport,
    channel: &mut Channel,
    file: FileId,
    progress: &mut dyn ProgressCallback,
) -> Result<Vec<u8>> {
    let (_, sw) = channel.exchange(transport, &select_ef(file.short_ef_id()))?;
    check_sw(sw)?;

    let mut buffer = Vec::new();
    let mut offset: u16 = 0;
    let mut chunk = DEFAULT_CHUNK;
    let mut total: Option<usize> = None;
    let progress_tag = file.progress_tag();

    loop {
        let want = match total {
            Some(total_len) => {
                let remaining = total_len.saturating_sub(buffer.len());
                if remaining == 0 {
                    break;
                }
                remaining.min(chunk as usize) as u8
            }
            None => HEADER_PROBE,
        };

        let data = read_one(transport, channel, offset, want, &mut chunk)?;
        if data.is_empty() {
            break;
        }
        offset = offset.saturating_add(data.len() as u16);
        buffer.extend_from_slice(&data);
        if total.is_none() {
            total = ber_total_length(&buffer);
        }
        if let Some(total_len) = total {
            // The header probe can overshoot a file shorter than the probe
            // size; never keep bytes past the TLV's own declared length.
            buffer.truncate(total_len);
        }
        if let Some(total_len) = total {
            let percent = ((buffer.len().min(total_len) * 100) / total_len.max(1)) as u8;
            progress.on_dg_progress(progress_tag, percent);
            progress.on_stage(Stage::Reading { dg_tag: progress_tag, percent });
        }
    }
    Ok(buffer)
}

/// Reads one `READ BINARY` window at `offset`. If the card reports `SW1 =
/// 6C` (wrong `Le`, `SW2` carries the length it actually holds), retries
/// once at the corrected length and resets `chunk` to the default so
/// later windows in this file don't keep overshooting.
fn read_one(transport: &mut dyn Transport, channel: &mut Channel, offset: u16, want: u8, chunk: &mut u8) -> Result<Vec<u8>> {
    let (data, sw) = channel.exchange(transport, &read_binary(offset, want))?;
    if sw.sw1() == 0x6C {
        *chunk = DEFAULT_CHUNK;
        let (data, sw) = channel.exchange(transport, &read_binary(offset, sw.sw2()))?;
        check_sw(sw)?;
        return Ok(data);
    }
    check_sw(sw)?;
    Ok(data)
}

fn check_sw(sw: StatusWord) -> Result<()> {
    if sw.is_success() {
        Ok(())
    } else {
        Err(ErrorKind::Apdu(sw).into())
    }
}

/// Parses just enough of a BER-TLV's header (a single-byte outer tag, as
/// every LDS file uses) to know the file's total encoded length. Returns
/// `None` until `buffer` holds enough bytes to tell.
fn ber_total_length(buffer: &[u8]) -> Option<usize> {
    let first_len_byte = *buffer.get(1)?;
    if first_len_byte < 0x80 {
        Some(2 + first_len_byte as usize)
    } else {
        let count = (first_len_byte & 0x7F) as usize;
        if count == 0 || count > 4 {
            return None;
        }
        let bytes = buffer.get(2..2 + count)?;
        let mut len = 0usize;
        for &b in bytes {
            len = (len << 8) | usize::from(b);
        }
        Some(2 + count + len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ber_total_length_short_form() {
        let buffer = [0x60, 0x05, 0, 0, 0, 0, 0];
        assert_eq!(ber_total_length(&buffer), Some(7));
    }

    #[test]
    fn ber_total_length_long_form() {
        let mut buffer = vec![0x77, 0x82, 0x01, 0x2C];
        buffer.extend_from_slice(&[0u8; 4]);
        assert_eq!(ber_total_length(&buffer), Some(4 + 0x012C));
    }

    #[test]
    fn ber_total_length_waits_for_enough_bytes() {
        let buffer = [0x77, 0x82];
        assert_eq!(ber_total_length(&buffer), None);
    }
}
