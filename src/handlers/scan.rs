// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fmt, sync::Arc};

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use tokio::task;
use tracing::{debug, info};

use crate::{
    client::{device::SedDevice, passthrough::PassthroughOpener},
    models::{identity::DiskIdentity, transport::TransportKind},
};

/// One line of scan output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub devref: String,
    /// `Unspecified` when the device could not be opened or did not answer
    /// the device-type inquiry.
    pub transport: TransportKind,
    /// `None` when the device could not be opened.
    pub identity: Option<DiskIdentity>,
}

impl ScanEntry {
    pub fn is_present(&self) -> bool {
        self.identity.is_some()
    }

    pub fn is_identified(&self) -> bool {
        self.identity.as_ref().is_some_and(|id| !id.is_unknown())
    }
}

impl fmt::Display for ScanEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.identity {
            None => write!(f, "{:<16} absent", self.devref),
            Some(id) if id.is_unknown() => write!(f, "{:<16} No", self.devref),
            Some(id) => write!(f, "{:<16} {id}", self.devref),
        }
    }
}

/// Open `devref`, identify it and close it again.
pub fn probe<O: PassthroughOpener>(opener: &O, devref: &str) -> ScanEntry {
    match SedDevice::open(opener, devref) {
        Ok(mut dev) => {
            let identity = dev.identify();
            ScanEntry {
                devref: devref.to_string(),
                transport: dev.transport_kind(),
                identity: Some(identity),
            }
        },
        Err(_) => ScanEntry {
            devref: devref.to_string(),
            transport: TransportKind::Unspecified,
            identity: None,
        },
    }
}

/// Probe every device reference, at most `max_parallel` at a time.
///
/// Passthrough calls block, so each probe runs on the blocking pool with its
/// own [`SedDevice`]. Entries come back in input order.
pub async fn scan<O>(
    opener: Arc<O>,
    devrefs: Vec<String>,
    max_parallel: usize,
) -> Result<Vec<ScanEntry>>
where
    O: PassthroughOpener + Send + Sync + 'static,
{
    info!(devices = devrefs.len(), max_parallel, "scanning");

    let results: Vec<_> = stream::iter(devrefs)
        .map(|devref| {
            let opener = Arc::clone(&opener);
            task::spawn_blocking(move || probe(opener.as_ref(), &devref))
        })
        .buffered(max_parallel.max(1))
        .collect()
        .await;

    let mut entries = Vec::with_capacity(results.len());
    for r in results {
        let entry = r.context("probe task panicked")?;
        debug!(devref = %entry.devref, transport = %entry.transport, "probed");
        entries.push(entry);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::sim::{SimulatedDisk, SimulatedOpener};

    #[test]
    fn absent_and_unidentified_lines() {
        let opener = SimulatedOpener::new()
            .with_disk("/dev/ada0", SimulatedDisk::ata("S1", "FW1", "MODEL"))
            .with_disk("/dev/cd0", SimulatedDisk::ata("", "", "").failing_inquiry());

        let present = probe(&opener, "/dev/ada0");
        assert!(present.is_identified());
        assert_eq!(present.transport, TransportKind::Ata);

        let silent = probe(&opener, "/dev/cd0");
        assert!(silent.is_present());
        assert!(!silent.is_identified());
        assert_eq!(silent.to_string(), format!("{:<16} No", "/dev/cd0"));

        let absent = probe(&opener, "/dev/ada9");
        assert!(!absent.is_present());
        assert_eq!(absent.to_string(), format!("{:<16} absent", "/dev/ada9"));
    }
}
