// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{collections::HashSet, fs, path::Path};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{
    cfg::enums::{TransportName, YesNo},
    client::device::DISCOVERY0_DEFAULT_LEN,
    models::{command::BLOCK_SIZE, status::CompletionStatus},
};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    /// Device references the tool knows about, with the fixture each
    /// simulated passthrough session answers from.
    pub devices: Vec<DeviceConfig>,
    /// Runtime knobs that are not device specific.
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// One device reference and what its passthrough session reports.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DeviceConfig {
    #[serde(rename = "Path")]
    /// Device reference (`/dev/pass0`, `/dev/ada0`, ...).
    pub path: String,

    #[serde(rename = "Transport")]
    /// Transport the device-type inquiry reports.
    pub transport: TransportName,

    #[serde(default, rename = "SerialNumber")]
    pub serial_number: String,

    #[serde(default, rename = "FirmwareRevision")]
    pub firmware_revision: String,

    #[serde(default, rename = "ModelNumber")]
    pub model_number: String,

    #[serde(default = "yes", rename = "NvmeAdmin")]
    /// Whether the session can carry NVMe admin commands.
    pub nvme_admin: YesNo,

    #[serde(default = "no", rename = "FailInquiry")]
    /// Device-type inquiry fails at the transport level.
    pub fail_inquiry: YesNo,

    #[serde(default = "no", rename = "FailSubmit")]
    /// Every command submission fails at the transport level.
    pub fail_submit: YesNo,

    #[serde(default, rename = "CompletionStatus")]
    /// Completion status every submitted command ends with.
    pub completion_status: CompletionStatus,

    #[serde(default, rename = "Discovery0Hex")]
    /// Level 0 Discovery response, hex encoded.
    pub discovery0_hex: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
/// Runtime-only settings.
pub struct RuntimeConfig {
    #[serde(default = "default_discovery0_length", rename = "Discovery0Length")]
    /// Receive buffer size for Level 0 Discovery (bytes).
    pub discovery0_length: usize,

    #[serde(default = "default_max_parallel_probes", rename = "MaxParallelProbes")]
    /// Upper bound on devices probed at the same time during a scan.
    pub max_parallel_probes: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            discovery0_length: default_discovery0_length(),
            max_parallel_probes: default_max_parallel_probes(),
        }
    }
}

fn yes() -> YesNo {
    YesNo::Yes
}

fn no() -> YesNo {
    YesNo::No
}

fn default_discovery0_length() -> usize {
    DISCOVERY0_DEFAULT_LEN
}

fn default_max_parallel_probes() -> usize {
    4
}

impl Config {
    /// Loads the configuration from YAML, validates it, and returns the
    /// ready-to-use value.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        let mut cfg: Config =
            serde_yaml::from_str(&s).context("failed to parse config YAML")?;
        cfg.validate_and_normalize()?;
        Ok(cfg)
    }

    /// Validates invariants and normalizes derived fields.
    pub fn validate_and_normalize(&mut self) -> Result<()> {
        let mut seen = HashSet::new();
        for dev in &mut self.devices {
            dev.path = dev.path.trim().to_string();
            ensure!(!dev.path.is_empty(), "device Path must not be empty");
            ensure!(
                seen.insert(dev.path.clone()),
                "duplicate device Path: {}",
                dev.path
            );

            if let Some(h) = dev.discovery0_hex.as_mut() {
                h.retain(|c| !c.is_whitespace());
                hex::decode(h.as_str())
                    .with_context(|| format!("{}: Discovery0Hex is not valid hex", dev.path))?;
            }
        }

        ensure!(
            self.runtime.discovery0_length > 0
                && self.runtime.discovery0_length.is_multiple_of(BLOCK_SIZE),
            "Discovery0Length must be a non-zero multiple of {BLOCK_SIZE}"
        );
        ensure!(
            self.runtime.max_parallel_probes >= 1,
            "MaxParallelProbes must be >= 1"
        );

        Ok(())
    }

    pub fn device(&self, path: &str) -> Option<&DeviceConfig> {
        self.devices.iter().find(|d| d.path == path)
    }

    pub fn device_paths(&self) -> Vec<String> {
        self.devices.iter().map(|d| d.path.clone()).collect()
    }
}

impl DeviceConfig {
    /// Decoded Level 0 Discovery response (empty when not configured).
    pub fn discovery0(&self) -> Result<Vec<u8>> {
        match &self.discovery0_hex {
            Some(h) => hex::decode(h).with_context(|| format!("{}: Discovery0Hex", self.path)),
            None => Ok(Vec::new()),
        }
    }
}
