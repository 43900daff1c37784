// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::models::{
    identify_data::{AtaIdentifyRaw, ScsiInquiryRaw, parse_ata_identify, parse_scsi_inquiry},
    status::CompletionStatus,
    transport::TransportKind,
};

/// Answer to the passthrough layer's "get device type" inquiry.
///
/// Besides the transport protocol code it carries whatever identification
/// the layer cached at attach time: the unit serial number and, depending on
/// the transport, standard INQUIRY data or ATA IDENTIFY data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceTypeReply {
    pub status: CompletionStatus,
    /// Raw protocol code (see [`crate::models::transport::proto`]).
    pub protocol: u32,
    /// Unit serial number; its length is the reported serial length.
    pub serial_num: Vec<u8>,
    /// Standard INQUIRY data (SCSI).
    pub inq_data: Vec<u8>,
    /// IDENTIFY DEVICE data (ATA).
    pub ident_data: Vec<u8>,
}

impl DeviceTypeReply {
    #[inline]
    pub fn transport(&self) -> TransportKind {
        TransportKind::from_raw(self.protocol)
    }

    pub fn scsi_inquiry(&self) -> Option<&ScsiInquiryRaw> {
        parse_scsi_inquiry(&self.inq_data).ok()
    }

    pub fn ata_identify(&self) -> Option<&AtaIdentifyRaw> {
        parse_ata_identify(&self.ident_data).ok()
    }
}
