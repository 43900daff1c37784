// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! SECURITY PROTOCOL IN (0xA2) / SECURITY PROTOCOL OUT (0xB5), 12-byte CDB
//! fillers that write into a provided 16-byte buffer.
//!
//! CDB layout (SPC-4 §6.40 / §6.41):
//!   [0]     = 0xA2 (IN) / 0xB5 (OUT)
//!   [1]     = SECURITY PROTOCOL
//!   [2..4]  = SECURITY PROTOCOL SPECIFIC (the ComID, big-endian)
//!   [4]     = INC_512 (bit 7): transfer length counts 512-byte blocks
//!   [5]     = reserved
//!   [6..10] = TRANSFER / ALLOCATION LENGTH (big-endian, u32)
//!   [10]    = reserved
//!   [11]    = CONTROL

use crate::{
    control_block::{DispatchError, FrameEncoder, block_count, dxfer_len},
    models::{
        command::{Direction, SecurityCommand},
        frame::{Frame, FrameHeader, FrameIo, SCSI_SENSE_LEN, ScsiIo},
        transport::TransportKind,
    },
};

pub const SECURITY_PROTOCOL_IN: u8 = 0xA2;
pub const SECURITY_PROTOCOL_OUT: u8 = 0xB5;
/// Byte 4, bit 7.
pub const INC_512: u8 = 0x80;
pub const SECURITY_CDB_LEN: u8 = 12;

/// Fill a SECURITY PROTOCOL IN/OUT CDB with INC_512 set.
///
/// * `opcode`   – [`SECURITY_PROTOCOL_IN`] or [`SECURITY_PROTOCOL_OUT`]
/// * `protocol` – security protocol number
/// * `com_id`   – security-protocol-specific field
/// * `blocks`   – transfer length in 512-byte units
#[inline]
pub fn fill_security_protocol(
    cdb: &mut [u8; 16],
    opcode: u8,
    protocol: u8,
    com_id: u16,
    blocks: u32,
) {
    cdb.fill(0);
    cdb[0] = opcode;
    cdb[1] = protocol;
    cdb[2..4].copy_from_slice(&com_id.to_be_bytes());
    cdb[4] = INC_512;
    cdb[6..10].copy_from_slice(&blocks.to_be_bytes());
}

#[inline]
pub fn fill_security_protocol_in(cdb: &mut [u8; 16], protocol: u8, com_id: u16, blocks: u32) {
    fill_security_protocol(cdb, SECURITY_PROTOCOL_IN, protocol, com_id, blocks)
}

#[inline]
pub fn fill_security_protocol_out(cdb: &mut [u8; 16], protocol: u8, com_id: u16, blocks: u32) {
    fill_security_protocol(cdb, SECURITY_PROTOCOL_OUT, protocol, com_id, blocks)
}

/// ComID carried in bytes 2..4.
#[inline]
pub fn security_protocol_com_id(cdb: &[u8; 16]) -> u16 {
    u16::from_be_bytes([cdb[2], cdb[3]])
}

/// Transfer length (512-byte blocks) carried in bytes 6..10.
#[inline]
pub fn security_protocol_blocks(cdb: &[u8; 16]) -> u32 {
    u32::from_be_bytes([cdb[6], cdb[7], cdb[8], cdb[9]])
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScsiEncoder;

impl FrameEncoder for ScsiEncoder {
    fn kind(&self) -> TransportKind {
        TransportKind::Scsi
    }

    fn encode(&self, cmd: &SecurityCommand<'_>) -> Result<Frame, DispatchError> {
        let blocks = block_count(TransportKind::Scsi, cmd.len(), u32::MAX)?;
        let dxfer_len = dxfer_len(TransportKind::Scsi, cmd.len())?;

        let mut cdb = [0u8; 16];
        match cmd.direction {
            Direction::Receive => {
                fill_security_protocol_in(&mut cdb, cmd.protocol, cmd.com_id, blocks)
            },
            Direction::Send => {
                fill_security_protocol_out(&mut cdb, cmd.protocol, cmd.com_id, blocks)
            },
        }

        Ok(Frame {
            header: FrameHeader::new(cmd.direction, dxfer_len),
            io: FrameIo::Scsi(ScsiIo {
                cdb,
                cdb_len: SECURITY_CDB_LEN,
                sense_len: SCSI_SENSE_LEN,
            }),
        })
    }
}
