// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Transport-native command structures handed to the passthrough layer.
//!
//! A [`Frame`] is a common header (direction, tag, timeout, transfer length)
//! plus one of three command bodies:
//!
//! * SCSI: a CDB (12 bytes used for SECURITY PROTOCOL IN/OUT, padded to 16)
//! * ATA: a 28-bit task file ([`AtaTaskFile`])
//! * NVMe: a 64-byte admin submission queue entry ([`NvmeCommand`])

use core::fmt;
use std::time::Duration;

use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout,
    byteorder::{LittleEndian, U16, U32, U64},
};

use crate::models::{command::Direction, transport::TransportKind};

/// Every security-protocol frame is given 60 seconds to complete.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(60);
/// Autosense buffer size requested for SCSI frames (full sense data).
pub const SCSI_SENSE_LEN: u8 = 252;

bitflags::bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    /// Frame header flags understood by the passthrough layer.
    pub struct FrameFlags: u32 {
        /// Data-in (device to host).
        const DIR_IN      = 0x0000_0040;
        /// Data-out (host to device).
        const DIR_OUT     = 0x0000_0080;
        /// Do not freeze the device queue when the command fails.
        const DEV_QFRZDIS = 0x0000_0400;
    }
}

impl From<Direction> for FrameFlags {
    #[inline]
    fn from(d: Direction) -> Self {
        match d {
            Direction::Receive => FrameFlags::DIR_IN,
            Direction::Send => FrameFlags::DIR_OUT,
        }
    }
}

/// Queueing mode requested for the frame.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TagAction {
    #[default]
    Simple = 0x20,
    HeadOfQueue = 0x21,
    Ordered = 0x22,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub flags: FrameFlags,
    pub tag_action: TagAction,
    pub timeout: Duration,
    pub dxfer_len: u32,
}

impl FrameHeader {
    /// Header used by every security-protocol and identify frame: direction
    /// flag, queue-freeze disabled, simple tag, 60 s timeout.
    pub fn new(direction: Direction, dxfer_len: u32) -> Self {
        Self {
            flags: FrameFlags::from(direction) | FrameFlags::DEV_QFRZDIS,
            tag_action: TagAction::Simple,
            timeout: COMMAND_TIMEOUT,
            dxfer_len,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match (
            self.flags.contains(FrameFlags::DIR_IN),
            self.flags.contains(FrameFlags::DIR_OUT),
        ) {
            (true, false) => Some(Direction::Receive),
            (false, true) => Some(Direction::Send),
            _ => None,
        }
    }
}

/// SCSI I/O body: CDB plus its used length.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScsiIo {
    pub cdb: [u8; 16],
    pub cdb_len: u8,
    pub sense_len: u8,
}

impl ScsiIo {
    #[inline]
    pub fn cdb_bytes(&self) -> &[u8] {
        &self.cdb[..usize::from(self.cdb_len).min(self.cdb.len())]
    }
}

/// ATA task file (28/48-bit register image).
#[repr(C)]
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable,
)]
pub struct AtaTaskFile {
    pub flags: u8,
    pub command: u8,
    pub features: u8,
    pub lba_low: u8,
    pub lba_mid: u8,
    pub lba_high: u8,
    pub device: u8,
    pub lba_low_exp: u8,
    pub lba_mid_exp: u8,
    pub lba_high_exp: u8,
    pub features_exp: u8,
    pub sector_count: u8,
    pub sector_count_exp: u8,
    pub control: u8,
}

/// NVMe admin submission queue entry (64 bytes, little-endian).
#[repr(C)]
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable,
)]
pub struct NvmeCommand {
    pub opc: u8,
    pub fuse: u8,
    pub cid: U16<LittleEndian>,
    pub nsid: U32<LittleEndian>,
    pub rsvd2: U32<LittleEndian>,
    pub rsvd3: U32<LittleEndian>,
    pub mptr: U64<LittleEndian>,
    pub prp1: U64<LittleEndian>,
    pub prp2: U64<LittleEndian>,
    pub cdw10: U32<LittleEndian>,
    pub cdw11: U32<LittleEndian>,
    pub cdw12: U32<LittleEndian>,
    pub cdw13: U32<LittleEndian>,
    pub cdw14: U32<LittleEndian>,
    pub cdw15: U32<LittleEndian>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameIo {
    Scsi(ScsiIo),
    Ata(AtaTaskFile),
    NvmeAdmin(NvmeCommand),
}

/// One transport-native command ready for submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub header: FrameHeader,
    pub io: FrameIo,
}

impl Frame {
    pub fn transport(&self) -> TransportKind {
        match self.io {
            FrameIo::Scsi(_) => TransportKind::Scsi,
            FrameIo::Ata(_) => TransportKind::Ata,
            FrameIo::NvmeAdmin(_) => TransportKind::Nvme,
        }
    }

    /// Operation code of the command body.
    pub fn opcode(&self) -> u8 {
        match &self.io {
            FrameIo::Scsi(io) => io.cdb[0],
            FrameIo::Ata(tf) => tf.command,
            FrameIo::NvmeAdmin(cmd) => cmd.opc,
        }
    }

    /// Raw bytes of the command body, as the device would see them.
    pub fn command_bytes(&self) -> &[u8] {
        match &self.io {
            FrameIo::Scsi(io) => io.cdb_bytes(),
            FrameIo::Ata(tf) => tf.as_bytes(),
            FrameIo::NvmeAdmin(cmd) => cmd.as_bytes(),
        }
    }

    pub fn scsi(&self) -> Option<&ScsiIo> {
        match &self.io {
            FrameIo::Scsi(io) => Some(io),
            _ => None,
        }
    }

    pub fn ata(&self) -> Option<&AtaTaskFile> {
        match &self.io {
            FrameIo::Ata(tf) => Some(tf),
            _ => None,
        }
    }

    pub fn nvme(&self) -> Option<&NvmeCommand> {
        match &self.io {
            FrameIo::NvmeAdmin(cmd) => Some(cmd),
            _ => None,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.header.direction() {
            Some(Direction::Receive) => "IN",
            Some(Direction::Send) => "OUT",
            None => "NONE",
        };
        write!(
            f,
            "{} opcode={:#04x} dir={dir} len={} timeout={}s tag={:?} cmd={}",
            self.transport(),
            self.opcode(),
            self.header.dxfer_len,
            self.header.timeout.as_secs(),
            self.header.tag_action,
            hex::encode(self.command_bytes()),
        )
    }
}
