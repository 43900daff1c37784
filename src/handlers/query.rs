// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::fmt;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::{
    client::{device::SedDevice, passthrough::PassthroughOpener},
    models::identity::DiskIdentity,
    utils::hex_dump,
};

/// Identity plus the raw Level 0 Discovery response of one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryReport {
    pub devref: String,
    pub identity: DiskIdentity,
    pub discovery0: Vec<u8>,
}

impl QueryReport {
    /// Total length field of the Level 0 Discovery header (bytes 0..4,
    /// big-endian), when the response is long enough to carry one.
    pub fn discovery0_length(&self) -> Option<u32> {
        let head: [u8; 4] = self.discovery0.get(..4)?.try_into().ok()?;
        Some(u32::from_be_bytes(head))
    }
}

impl fmt::Display for QueryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.devref, self.identity)?;
        if let Some(len) = self.discovery0_length() {
            writeln!(f, "Level 0 Discovery, header length {len}")?;
        }
        f.write_str(&hex_dump(&self.discovery0))
    }
}

/// Identify `devref` and read its Level 0 Discovery response into a
/// `len`-byte buffer.
pub fn query<O: PassthroughOpener>(opener: &O, devref: &str, len: usize) -> Result<QueryReport> {
    let mut dev = SedDevice::open(opener, devref)
        .with_context(|| format!("failed to open {devref}"))?;

    let identity = dev.identify();
    if identity.is_unknown() {
        bail!("{devref}: device could not be identified");
    }
    info!(devref, identity = %identity, "identified");

    let discovery0 = dev
        .discovery0(len)
        .with_context(|| format!("{devref}: Level 0 Discovery failed"))?;

    Ok(QueryReport {
        devref: devref.to_string(),
        identity,
        discovery0,
    })
}
