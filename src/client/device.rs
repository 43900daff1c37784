// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use once_cell::sync::OnceCell;
use tracing::{Level, debug, enabled, error, trace, warn};

use crate::{
    client::passthrough::{Passthrough, PassthroughOpener, TransportError},
    control_block::{
        DispatchError, FrameEncoder, TransportBinding, TransportEncoder,
        nvme::build_identify_controller,
    },
    models::{
        command::SecurityCommand,
        device_type::DeviceTypeReply,
        frame::Frame,
        identify_data::{NvmeControllerData, parse_nvme_controller},
        identity::{DeviceType, DiskIdentity},
        status::CompletionStatus,
        transport::TransportKind,
    },
    utils::hex_dump,
};

/// Level 0 Discovery: security protocol 0x01, ComID 0x0001.
pub const DISCOVERY0_PROTOCOL: u8 = 0x01;
pub const DISCOVERY0_COM_ID: u16 = 0x0001;
pub const DISCOVERY0_DEFAULT_LEN: usize = 2048;

/// A self-encrypting drive reached through a passthrough session.
///
/// The session is owned exclusively and closed on drop. [`Self::identify`]
/// must complete before [`Self::send_cmd`]; the discovered transport is
/// kept in a set-once cell and never changes afterwards.
pub struct SedDevice<P: Passthrough> {
    devref: String,
    handle: P,
    binding: OnceCell<TransportBinding>,
}

impl<P: Passthrough> SedDevice<P> {
    pub fn open<O>(opener: &O, devref: &str) -> Result<Self, TransportError>
    where O: PassthroughOpener<Handle = P> {
        debug!(devref, "creating device");
        // debug, not error: scanners treat an open failure as end of scan
        let handle = opener
            .open(devref)
            .inspect_err(|e| debug!(devref, error = %e, "error opening device"))?;
        Ok(Self::from_handle(devref, handle))
    }

    pub fn from_handle(devref: impl Into<String>, handle: P) -> Self {
        Self {
            devref: devref.into(),
            handle,
            binding: OnceCell::new(),
        }
    }

    #[inline]
    pub fn devref(&self) -> &str {
        &self.devref
    }

    #[inline]
    pub fn handle(&self) -> &P {
        &self.handle
    }

    #[inline]
    pub fn binding(&self) -> Option<&TransportBinding> {
        self.binding.get()
    }

    /// `Unspecified` until identification has recorded a transport.
    pub fn transport_kind(&self) -> TransportKind {
        self.binding
            .get()
            .map_or(TransportKind::Unspecified, TransportBinding::kind)
    }

    /// Probe the device and return its normalized identity.
    ///
    /// Never fails: anything that goes wrong yields `DeviceType::Other` with
    /// all fields zeroed, which callers use as a discovery signal.
    pub fn identify(&mut self) -> DiskIdentity {
        trace!(devref = %self.devref, "entering identify");

        let reply = match self.handle.get_device_type() {
            Ok(reply) => reply,
            Err(e) => {
                trace!(devref = %self.devref, error = %e, "device type inquiry failed");
                return DiskIdentity::unknown();
            },
        };
        if !reply.status.is_completed() {
            trace!(devref = %self.devref, status = %reply.status, "device type inquiry error");
            return DiskIdentity::unknown();
        }

        let reported = reply.transport();
        let binding = *self.binding.get_or_init(|| {
            TransportBinding::select(reported, self.handle.nvme_admin())
        });
        if binding.kind() != reported {
            warn!(
                devref = %self.devref,
                bound = %binding.kind(),
                %reported,
                "transport already bound, ignoring new report"
            );
            return DiskIdentity::unknown();
        }

        match binding {
            TransportBinding::Bound(TransportEncoder::Scsi(_)) => {
                identity_from_inquiry(DeviceType::Sas, &reply)
            },
            TransportBinding::Bound(TransportEncoder::Ata(_)) => {
                identity_from_inquiry(DeviceType::Ata, &reply)
            },
            TransportBinding::Bound(TransportEncoder::Nvme(_)) => self.identify_nvme(),
            TransportBinding::Unavailable(kind) => {
                debug!(devref = %self.devref, %kind, "transport not available on this build");
                DiskIdentity::unknown()
            },
            TransportBinding::Unsupported(kind) => {
                debug!(devref = %self.devref, %kind, "unsupported transport");
                DiskIdentity::unknown()
            },
        }
    }

    fn identify_nvme(&mut self) -> DiskIdentity {
        let frame = build_identify_controller();
        let mut data = vec![0u8; NvmeControllerData::LEN];

        match self.handle.submit(&frame, &mut data) {
            Err(e) => {
                trace!(devref = %self.devref, error = %e, "identify controller submit failed");
                return DiskIdentity::unknown();
            },
            Ok(status) if !status.is_completed() => {
                self.dump_failed(&frame, status);
                return DiskIdentity::unknown();
            },
            Ok(_) => {},
        }

        match parse_nvme_controller(&data) {
            Ok(cd) => DiskIdentity::from_fields(DeviceType::Nvme, &cd.sn, &cd.fr, &cd.mn),
            Err(e) => {
                trace!(devref = %self.devref, error = %e, "identify controller data");
                DiskIdentity::unknown()
            },
        }
    }

    /// Frame `cmd` for the bound transport, submit it and wait for
    /// completion. The buffer is in/out: data-in lands in it in place.
    pub fn send_cmd(&mut self, cmd: SecurityCommand<'_>) -> Result<(), DispatchError> {
        let encoder = self
            .binding
            .get()
            .ok_or(DispatchError::NotIdentified)
            .and_then(TransportBinding::encoder)
            .inspect_err(|e| error!(devref = %self.devref, error = %e, "cannot dispatch"))?;

        let frame = encoder.encode(&cmd)?;
        trace!(devref = %self.devref, ?cmd, %frame, "dispatching");

        let status = self
            .handle
            .submit(&frame, cmd.buffer)
            .inspect_err(|e| trace!(devref = %self.devref, error = %e, "passthrough submit failed"))?;

        if !status.is_completed() {
            self.dump_failed(&frame, status);
            return Err(DispatchError::Completion(status));
        }
        Ok(())
    }

    /// Level 0 Discovery response, unparsed. `len` is the receive buffer
    /// size (a multiple of 512 on ATA/SCSI).
    pub fn discovery0(&mut self, len: usize) -> Result<Vec<u8>, DispatchError> {
        let mut buf = vec![0u8; len];
        self.send_cmd(SecurityCommand::receive(
            DISCOVERY0_PROTOCOL,
            DISCOVERY0_COM_ID,
            &mut buf,
        ))?;
        Ok(buf)
    }

    fn dump_failed(&self, frame: &Frame, status: CompletionStatus) {
        if enabled!(Level::TRACE) {
            trace!(
                devref = %self.devref,
                %status,
                %frame,
                "command completed with error\n{}",
                hex_dump(frame.command_bytes())
            );
        }
    }
}

impl<P: Passthrough> Drop for SedDevice<P> {
    fn drop(&mut self) {
        debug!(devref = %self.devref, "destroying device");
        self.handle.close();
    }
}

/// ATA and SCSI identity comes straight out of the inquiry reply.
fn identity_from_inquiry(device_type: DeviceType, reply: &DeviceTypeReply) -> DiskIdentity {
    match device_type {
        DeviceType::Sas => {
            let inq = reply.scsi_inquiry();
            DiskIdentity::from_fields(
                device_type,
                &reply.serial_num,
                inq.map_or(&[][..], |i| &i.revision[..]),
                inq.map_or(&[][..], |i| i.vendor_product()),
            )
        },
        DeviceType::Ata => {
            let ident = reply.ata_identify();
            DiskIdentity::from_fields(
                device_type,
                &reply.serial_num,
                ident.map_or(&[][..], |i| &i.revision[..]),
                ident.map_or(&[][..], |i| &i.model[..]),
            )
        },
        DeviceType::Nvme | DeviceType::Other => DiskIdentity::unknown(),
    }
}
