// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::models::transport::{TransportKind, proto};

/// Boolean enumeration with string serialization support
///
/// Represents yes/no values with support for various string representations
/// including "Yes"/"No", "true"/"false", and "1"/"0".
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum YesNo {
    #[serde(
        rename = "Yes",
        alias = "yes",
        alias = "YES",
        alias = "true",
        alias = "True",
        alias = "1"
    )]
    Yes,
    #[serde(
        rename = "No",
        alias = "no",
        alias = "NO",
        alias = "false",
        alias = "False",
        alias = "0"
    )]
    No,
}
impl fmt::Display for YesNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        })
    }
}
impl From<bool> for YesNo {
    fn from(b: bool) -> Self {
        if b { YesNo::Yes } else { YesNo::No }
    }
}
impl YesNo {
    pub fn as_bool(self) -> bool {
        matches!(self, YesNo::Yes)
    }
}

/// Transport a configured (simulated) device reports.
///
/// `Absent` describes a device reference that cannot be opened at all.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportName {
    #[serde(rename = "ATA", alias = "ata", alias = "Ata", alias = "SATA")]
    Ata,
    #[serde(rename = "SCSI", alias = "scsi", alias = "Scsi", alias = "SAS")]
    Scsi,
    #[serde(rename = "NVMe", alias = "nvme", alias = "NVME", alias = "Nvme")]
    Nvme,
    #[serde(rename = "Other", alias = "other", alias = "OTHER")]
    Other,
    #[serde(rename = "Absent", alias = "absent", alias = "ABSENT")]
    Absent,
}
impl fmt::Display for TransportName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransportName::Ata => "ATA",
            TransportName::Scsi => "SCSI",
            TransportName::Nvme => "NVMe",
            TransportName::Other => "Other",
            TransportName::Absent => "Absent",
        })
    }
}
impl TransportName {
    /// `None` for [`TransportName::Absent`]. `Other` maps to an ATAPI
    /// protocol code, which the dispatcher does not carry.
    pub fn kind(self) -> Option<TransportKind> {
        match self {
            TransportName::Ata => Some(TransportKind::Ata),
            TransportName::Scsi => Some(TransportKind::Scsi),
            TransportName::Nvme => Some(TransportKind::Nvme),
            TransportName::Other => Some(TransportKind::Other(proto::ATAPI)),
            TransportName::Absent => None,
        }
    }
}
