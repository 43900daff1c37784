// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use core::fmt;

use serde::{Deserialize, Serialize};

/// Completion status reported by the passthrough layer once a frame has
/// been carried to the device. Only the low six bits identify the status;
/// the upper bits are queue/autosense flags.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionStatus(pub u32);

impl CompletionStatus {
    pub const MASK: u32 = 0x3F;

    pub const REQ_INPROG: Self = Self(0x00);
    pub const REQ_CMP: Self = Self(0x01);
    pub const REQ_ABORTED: Self = Self(0x02);
    pub const REQ_CMP_ERR: Self = Self(0x04);
    pub const BUSY: Self = Self(0x05);
    pub const REQ_INVALID: Self = Self(0x06);
    pub const DEV_NOT_THERE: Self = Self(0x08);
    pub const SEL_TIMEOUT: Self = Self(0x0A);
    pub const CMD_TIMEOUT: Self = Self(0x0B);
    pub const SCSI_STATUS_ERROR: Self = Self(0x0C);
    pub const ATA_STATUS_ERROR: Self = Self(0x1B);

    #[inline]
    pub const fn code(self) -> u32 {
        self.0 & Self::MASK
    }

    /// "Completed without error".
    #[inline]
    pub const fn is_completed(self) -> bool {
        self.code() == Self::REQ_CMP.0
    }

    fn name(self) -> Option<&'static str> {
        Some(match Self(self.code()) {
            Self::REQ_INPROG => "REQ_INPROG",
            Self::REQ_CMP => "REQ_CMP",
            Self::REQ_ABORTED => "REQ_ABORTED",
            Self::REQ_CMP_ERR => "REQ_CMP_ERR",
            Self::BUSY => "BUSY",
            Self::REQ_INVALID => "REQ_INVALID",
            Self::DEV_NOT_THERE => "DEV_NOT_THERE",
            Self::SEL_TIMEOUT => "SEL_TIMEOUT",
            Self::CMD_TIMEOUT => "CMD_TIMEOUT",
            Self::SCSI_STATUS_ERROR => "SCSI_STATUS_ERROR",
            Self::ATA_STATUS_ERROR => "ATA_STATUS_ERROR",
            _ => return None,
        })
    }
}

impl Default for CompletionStatus {
    fn default() -> Self {
        Self::REQ_CMP
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}({:#04x})", self.0),
            None => write!(f, "{:#04x}", self.0),
        }
    }
}

impl fmt::Debug for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompletionStatus({self})")
    }
}
