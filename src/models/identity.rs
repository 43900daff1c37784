// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Normalized device identity.
//!
//! Every transport reports serial / firmware / model in differently sized
//! fields; they all land here in fixed-width, zero-padded ASCII fields.

use core::fmt;

use crate::utils::trim_ascii;

pub const SERIAL_NUMBER_LEN: usize = 20;
pub const FIRMWARE_REVISION_LEN: usize = 8;
pub const MODEL_NUMBER_LEN: usize = 40;

/// Device class as exposed to the session layer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Ata,
    /// SCSI / SAS attached.
    Sas,
    Nvme,
    #[default]
    Other,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeviceType::Ata => "ATA",
            DeviceType::Sas => "SAS",
            DeviceType::Nvme => "NVMe",
            DeviceType::Other => "Other",
        })
    }
}

/// Copies `min(src.len(), dst.len())` bytes and zero-fills whatever is left
/// of `dst`. Returns the number of bytes copied.
#[inline]
pub fn bounded_copy(dst: &mut [u8], src: &[u8]) -> usize {
    let n = dst.len().min(src.len());
    dst[..n].copy_from_slice(&src[..n]);
    dst[n..].fill(0);
    n
}

#[derive(Clone, PartialEq, Eq)]
pub struct DiskIdentity {
    pub device_type: DeviceType,
    pub serial_number: [u8; SERIAL_NUMBER_LEN],
    pub firmware_revision: [u8; FIRMWARE_REVISION_LEN],
    pub model_number: [u8; MODEL_NUMBER_LEN],
}

impl DiskIdentity {
    /// `Other` with every field zeroed: the answer for anything that could
    /// not be identified.
    pub const fn unknown() -> Self {
        Self {
            device_type: DeviceType::Other,
            serial_number: [0; SERIAL_NUMBER_LEN],
            firmware_revision: [0; FIRMWARE_REVISION_LEN],
            model_number: [0; MODEL_NUMBER_LEN],
        }
    }

    /// Builds an identity from transport fields of arbitrary width.
    pub fn from_fields(
        device_type: DeviceType,
        serial: &[u8],
        firmware: &[u8],
        model: &[u8],
    ) -> Self {
        let mut id = Self::unknown();
        id.device_type = device_type;
        bounded_copy(&mut id.serial_number, serial);
        bounded_copy(&mut id.firmware_revision, firmware);
        bounded_copy(&mut id.model_number, model);
        id
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        self.device_type == DeviceType::Other
    }

    pub fn serial(&self) -> String {
        trim_ascii(&self.serial_number)
    }

    pub fn firmware(&self) -> String {
        trim_ascii(&self.firmware_revision)
    }

    pub fn model(&self) -> String {
        trim_ascii(&self.model_number)
    }
}

impl Default for DiskIdentity {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Debug for DiskIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiskIdentity")
            .field("device_type", &self.device_type)
            .field("serial_number", &self.serial())
            .field("firmware_revision", &self.firmware())
            .field("model_number", &self.model())
            .finish()
    }
}

impl fmt::Display for DiskIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<5} {:<40} {:<20} {}",
            self.device_type,
            self.model(),
            self.serial(),
            self.firmware()
        )
    }
}
