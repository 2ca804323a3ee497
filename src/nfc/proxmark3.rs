//! A [`Transport`] backed by a Proxmark3 RDV4 connected over USB, relaying
//! ISO 14443-4 APDUs via its `CMD_HF_ISO14443A_READER` command set. Gated
//! behind the `proxmark3` feature; this is the `reader` binary's concrete
//! transport, not part of the protocol core.

use {
    super::Transport,
    crate::error::{ErrorKind, Result},
    rusb::{Device, DeviceHandle, GlobalContext},
    std::time::Duration,
};

const PM3_VENDOR_ID: u16 = 0x9ac4;
const PM3_PRODUCT_ID: u16 = 0x4b8f;
const USB_TIMEOUT: Duration = Duration::from_secs(5);

/// A connected Proxmark3, already selected onto an ISO 14443-A card.
pub struct Proxmark3Transport {
    handle:    DeviceHandle<GlobalContext>,
    endpoint_out: u8,
    endpoint_in:  u8,
}

impl Proxmark3Transport {
    /// Opens the first Proxmark3 found on the USB bus and activates its
    /// field against an ISO 14443-A card.
    pub fn connect() -> Result<Self> {
        let device = find_device()?;
        let mut handle = device
            .open()
            .map_err(|_| ErrorKind::ConnectionLost)?;
        handle
            .claim_interface(0)
            .map_err(|_| ErrorKind::ConnectionLost)?;
        let config = device
            .active_config_descriptor()
            .map_err(|_| ErrorKind::ConnectionLost)?;
        let interface = config
            .interfaces()
            .next()
            .ok_or(ErrorKind::ConnectionLost)?;
        let descriptor = interface
            .descriptors()
            .next()
            .ok_or(ErrorKind::ConnectionLost)?;
        let mut endpoint_out = None;
        let mut endpoint_in = None;
        for endpoint in descriptor.endpoint_descriptors() {
            match endpoint.direction() {
                rusb::Direction::Out => endpoint_out = Some(endpoint.address()),
                rusb::Direction::In => endpoint_in = Some(endpoint.address()),
            }
        }
        let transport = Self {
            handle,
            endpoint_out: endpoint_out.ok_or(ErrorKind::ConnectionLost)?,
            endpoint_in: endpoint_in.ok_or(ErrorKind::ConnectionLost)?,
        };
        transport.select_iso14443a()?;
        Ok(transport)
    }

    fn select_iso14443a(&self) -> Result<()> {
        // CMD_HF_ISO14443A_READER with the "connect, keep field on" flags.
        const CMD_HF_ISO14443A_READER: u64 = 0x0385;
        const ISO14_CONNECT: u32 = 1 << 0;
        self.send_command(CMD_HF_ISO14443A_READER, ISO14_CONNECT, 0, 0, &[])
            .map(|_| ())
    }

    fn send_command(
        &self,
        cmd: u64,
        arg0: u32,
        arg1: u32,
        arg2: u32,
        data: &[u8],
    ) -> Result<Vec<u8>> {
        let mut packet = Vec::with_capacity(24 + data.len());
        packet.extend_from_slice(&cmd.to_le_bytes());
        packet.extend_from_slice(&arg0.to_le_bytes());
        packet.extend_from_slice(&arg1.to_le_bytes());
        packet.extend_from_slice(&arg2.to_le_bytes());
        packet.extend_from_slice(data);

        self.handle
            .write_bulk(self.endpoint_out, &packet, USB_TIMEOUT)
            .map_err(|_| ErrorKind::ConnectionLost)?;

        let mut response = vec![0u8; 512];
        let read = self
            .handle
            .read_bulk(self.endpoint_in, &mut response, USB_TIMEOUT)
            .map_err(|_| ErrorKind::ConnectionLost)?;
        response.truncate(read);
        Ok(response)
    }
}

impl Transport for Proxmark3Transport {
    fn send(&mut self, command: &[u8]) -> Result<(Vec<u8>, u8, u8)> {
        // CMD_HF_ISO14443A_READER with the "raw APDU, no CRC appended by
        // the reader" flags; the response is the bare APDU response
        // (ISO 14443-4 already strips the PCB/block-number framing).
        const CMD_HF_ISO14443A_READER: u64 = 0x0385;
        const ISO14_RAW: u32 = 1 << 3;
        const ISO14_APPEND_CRC: u32 = 1 << 5;

        let response = self.send_command(
            CMD_HF_ISO14443A_READER,
            ISO14_RAW | ISO14_APPEND_CRC,
            command.len() as u32,
            0,
            command,
        )?;
        if response.len() < 2 {
            return Err(ErrorKind::ConnectionLost.into());
        }
        let sw1 = response[response.len() - 2];
        let sw2 = response[response.len() - 1];
        let data = response[..response.len() - 2].to_vec();
        Ok((data, sw1, sw2))
    }
}

fn find_device() -> Result<Device<GlobalContext>> {
    let devices = rusb::devices().map_err(|_| ErrorKind::ConnectionLost)?;
    for device in devices.iter() {
        if let Ok(descriptor) = device.device_descriptor() {
            if descriptor.vendor_id() == PM3_VENDOR_ID && descriptor.product_id() == PM3_PRODUCT_ID
            {
                return Ok(device);
            }
        }
    }
    Err(ErrorKind::ConnectionLost.into())
}
