// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Zero-copy views over the identification payloads each transport returns.
//!
//! * SCSI standard INQUIRY data (first 36 bytes, SPC)
//! * ATA IDENTIFY DEVICE data (512 bytes). String fields are expected in
//!   reading order, as the passthrough layer delivers them already
//!   byte-swapped.
//! * NVMe Identify Controller data structure (4096 bytes)

use core::ops::Range;

use anyhow::{Result, anyhow};
use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout,
    byteorder::{LittleEndian, U16},
};

/// Standard INQUIRY data, bytes 0..36.
#[repr(C)]
#[derive(Debug, Clone, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct ScsiInquiryRaw {
    pub device: u8,
    pub dev_qual2: u8,
    pub version: u8,
    pub response_format: u8,
    pub additional_length: u8,
    pub spc3_flags: u8,
    pub spc2_flags: u8,
    pub flags: u8,
    pub vendor: [u8; 8],
    pub product: [u8; 16],
    pub revision: [u8; 4],
}

impl ScsiInquiryRaw {
    pub const LEN: usize = 36;
    /// Vendor and product identification are contiguous; together they form
    /// the model string.
    pub const VENDOR_PRODUCT: Range<usize> = 8..32;

    #[inline]
    pub fn vendor_product(&self) -> &[u8] {
        &self.as_bytes()[Self::VENDOR_PRODUCT]
    }
}

/// ATA IDENTIFY DEVICE data. Only the string fields are broken out.
#[repr(C)]
#[derive(Debug, Clone, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct AtaIdentifyRaw {
    /// Words 0..=9.
    pub config: [u8; 20],
    /// Words 10..=19.
    pub serial: [u8; 20],
    /// Words 20..=22.
    pub obsolete: [u8; 6],
    /// Words 23..=26.
    pub revision: [u8; 8],
    /// Words 27..=46.
    pub model: [u8; 40],
    /// Words 47..=255.
    pub rest: [u8; 418],
}

impl AtaIdentifyRaw {
    pub const LEN: usize = 512;
}

/// NVMe Identify Controller data structure (CNS 01h).
#[repr(C)]
#[derive(Debug, Clone, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct NvmeControllerData {
    /// PCI vendor id.
    pub vid: U16<LittleEndian>,
    /// PCI subsystem vendor id.
    pub ssvid: U16<LittleEndian>,
    /// Serial number.
    pub sn: [u8; 20],
    /// Model number.
    pub mn: [u8; 40],
    /// Firmware revision.
    pub fr: [u8; 8],
    pub rest: [u8; 4024],
}

impl NvmeControllerData {
    pub const LEN: usize = 4096;
}

/// View the head of a standard INQUIRY response (needs ≥ 36 bytes).
#[inline]
pub fn parse_scsi_inquiry(buf: &[u8]) -> Result<&ScsiInquiryRaw> {
    let (raw, _rest) = ScsiInquiryRaw::ref_from_prefix(buf)
        .map_err(|_| anyhow!("INQUIRY: need ≥ 36 bytes, got {}", buf.len()))?;
    Ok(raw)
}

/// View an ATA IDENTIFY DEVICE response (needs ≥ 512 bytes).
#[inline]
pub fn parse_ata_identify(buf: &[u8]) -> Result<&AtaIdentifyRaw> {
    let (raw, _rest) = AtaIdentifyRaw::ref_from_prefix(buf)
        .map_err(|_| anyhow!("IDENTIFY DEVICE: need ≥ 512 bytes, got {}", buf.len()))?;
    Ok(raw)
}

/// View an NVMe Identify Controller response (needs ≥ 4096 bytes).
#[inline]
pub fn parse_nvme_controller(buf: &[u8]) -> Result<&NvmeControllerData> {
    let (raw, _rest) = NvmeControllerData::ref_from_prefix(buf).map_err(|_| {
        anyhow!("IDENTIFY CONTROLLER: need ≥ 4096 bytes, got {}", buf.len())
    })?;
    Ok(raw)
}
