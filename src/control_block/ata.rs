// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! TRUSTED RECEIVE (0x5C) / TRUSTED SEND (0x5E) task-file fillers.
//!
//! Register layout (ACS-3 §7.53 / §7.54):
//!   FEATURE       = SECURITY PROTOCOL
//!   COUNT         = TRANSFER LENGTH bits 7:0 (512-byte blocks)
//!   LBA 7:0       = TRANSFER LENGTH bits 15:8
//!   LBA 23:8      = SP SPECIFIC (ComID): mid = low byte, high = high byte
//!   DEVICE        = 0x40 (LBA mode)

use crate::{
    control_block::{DispatchError, FrameEncoder, block_count, dxfer_len},
    models::{
        command::{Direction, SecurityCommand},
        frame::{AtaTaskFile, Frame, FrameHeader, FrameIo},
        transport::TransportKind,
    },
};

pub const TRUSTED_RECEIVE: u8 = 0x5C;
pub const TRUSTED_SEND: u8 = 0x5E;
pub const DEVICE_LBA: u8 = 0x40;
/// COUNT and LBA 7:0 together hold a 16-bit block count.
pub const MAX_TRANSFER_BLOCKS: u32 = u16::MAX as u32;

/// ATA command code for a transfer direction (IF_RECV / IF_SEND).
#[inline]
pub const fn trusted_command(direction: Direction) -> u8 {
    match direction {
        Direction::Receive => TRUSTED_RECEIVE,
        Direction::Send => TRUSTED_SEND,
    }
}

/// Fill a TRUSTED RECEIVE/SEND task file.
#[inline]
pub fn fill_trusted(
    tf: &mut AtaTaskFile,
    command: u8,
    protocol: u8,
    com_id: u16,
    blocks: u16,
) {
    let [blocks_hi, blocks_lo] = blocks.to_be_bytes();
    let [com_id_hi, com_id_lo] = com_id.to_be_bytes();

    *tf = AtaTaskFile::default();
    tf.command = command;
    tf.features = protocol;
    tf.sector_count = blocks_lo;
    tf.lba_low = blocks_hi;
    tf.lba_mid = com_id_lo;
    tf.lba_high = com_id_hi;
    tf.device = DEVICE_LBA;
}

impl AtaTaskFile {
    /// Transfer length in 512-byte blocks (COUNT + LBA 7:0).
    #[inline]
    pub fn transfer_blocks(&self) -> u16 {
        u16::from_be_bytes([self.lba_low, self.sector_count])
    }

    /// ComID (LBA 23:8).
    #[inline]
    pub fn com_id(&self) -> u16 {
        u16::from_be_bytes([self.lba_high, self.lba_mid])
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AtaEncoder;

impl FrameEncoder for AtaEncoder {
    fn kind(&self) -> TransportKind {
        TransportKind::Ata
    }

    fn encode(&self, cmd: &SecurityCommand<'_>) -> Result<Frame, DispatchError> {
        let blocks = block_count(TransportKind::Ata, cmd.len(), MAX_TRANSFER_BLOCKS)?;
        let dxfer_len = dxfer_len(TransportKind::Ata, cmd.len())?;

        let mut tf = AtaTaskFile::default();
        fill_trusted(
            &mut tf,
            trusted_command(cmd.direction),
            cmd.protocol,
            cmd.com_id,
            // bounded by MAX_TRANSFER_BLOCKS above
            blocks as u16,
        );

        Ok(Frame {
            header: FrameHeader::new(cmd.direction, dxfer_len),
            io: FrameIo::Ata(tf),
        })
    }
}
