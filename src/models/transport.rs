// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Transport kinds as reported by the passthrough layer's device-type
//! inquiry.
//!
//! The raw codes follow the CAM `cam_proto` numbering, which is what the
//! passthrough layer hands back in its inquiry reply:
//!
//! ```text
//!  0 UNKNOWN   1 UNSPECIFIED   2 SCSI   3 ATA   4 ATAPI
//!  5 SATAPM    6 SEMB          7 NVME   8 MMCSD
//! ```

use core::fmt;

/// Raw protocol codes carried in the device-type inquiry reply.
pub mod proto {
    pub const UNKNOWN: u32 = 0;
    pub const UNSPECIFIED: u32 = 1;
    pub const SCSI: u32 = 2;
    pub const ATA: u32 = 3;
    pub const ATAPI: u32 = 4;
    pub const SATAPM: u32 = 5;
    pub const SEMB: u32 = 6;
    pub const NVME: u32 = 7;
    pub const MMCSD: u32 = 8;
}

/// Transport a device speaks, decoded from the raw protocol code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    Unspecified,
    Ata,
    Scsi,
    Nvme,
    /// Any other protocol code (ATAPI, SEMB, MMC/SD, unknown ...).
    Other(u32),
}

impl TransportKind {
    #[inline]
    pub fn from_raw(code: u32) -> Self {
        match code {
            proto::UNSPECIFIED => Self::Unspecified,
            proto::SCSI => Self::Scsi,
            proto::ATA => Self::Ata,
            proto::NVME => Self::Nvme,
            other => Self::Other(other),
        }
    }

    #[inline]
    pub fn raw(self) -> u32 {
        match self {
            Self::Unspecified => proto::UNSPECIFIED,
            Self::Scsi => proto::SCSI,
            Self::Ata => proto::ATA,
            Self::Nvme => proto::NVME,
            Self::Other(code) => code,
        }
    }

    /// ATA and SCSI encode the transfer length as a count of 512-byte
    /// blocks; NVMe carries the raw byte count.
    #[inline]
    pub fn uses_block_count(self) -> bool {
        matches!(self, Self::Ata | Self::Scsi)
    }
}

impl From<u32> for TransportKind {
    #[inline]
    fn from(code: u32) -> Self {
        Self::from_raw(code)
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unspecified => f.write_str("Unspecified"),
            Self::Ata => f.write_str("ATA"),
            Self::Scsi => f.write_str("SCSI"),
            Self::Nvme => f.write_str("NVMe"),
            Self::Other(code) => write!(f, "Other({code})"),
        }
    }
}
