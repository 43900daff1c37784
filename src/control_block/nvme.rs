// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! NVMe admin commands: Security Send (0x81), Security Receive (0x82) and
//! Identify (0x06).
//!
//! Security Send / Receive (NVMe base spec §5.25 / §5.26):
//!   CDW10 bits 31:24 = SECP  (security protocol)
//!   CDW10 bits 23:8  = SPSP  (ComID)
//!   CDW11            = TL / AL in bytes (not scaled)

use zerocopy::byteorder::U32;

use crate::{
    control_block::{DispatchError, FrameEncoder, dxfer_len},
    models::{
        command::{Direction, SecurityCommand},
        frame::{Frame, FrameHeader, FrameIo, NvmeCommand},
        identify_data::NvmeControllerData,
        transport::TransportKind,
    },
};

pub const ADMIN_IDENTIFY: u8 = 0x06;
pub const ADMIN_SECURITY_SEND: u8 = 0x81;
pub const ADMIN_SECURITY_RECEIVE: u8 = 0x82;
/// Identify CNS value selecting the controller data structure.
pub const CNS_CONTROLLER: u32 = 0x01;

#[inline]
pub const fn security_opcode(direction: Direction) -> u8 {
    match direction {
        Direction::Receive => ADMIN_SECURITY_RECEIVE,
        Direction::Send => ADMIN_SECURITY_SEND,
    }
}

/// CDW10 of Security Send / Receive.
#[inline]
pub const fn security_cdw10(protocol: u8, com_id: u16) -> u32 {
    ((protocol as u32) << 24) | ((com_id as u32) << 8)
}

/// Fill a Security Send / Receive submission entry.
#[inline]
pub fn fill_security(cmd: &mut NvmeCommand, opcode: u8, protocol: u8, com_id: u16, len: u32) {
    *cmd = NvmeCommand::default();
    cmd.opc = opcode;
    cmd.cdw10 = U32::new(security_cdw10(protocol, com_id));
    cmd.cdw11 = U32::new(len);
}

/// Identify Controller frame: data-in, 4096 bytes.
pub fn build_identify_controller() -> Frame {
    let cmd = NvmeCommand {
        opc: ADMIN_IDENTIFY,
        cdw10: U32::new(CNS_CONTROLLER),
        ..Default::default()
    };
    Frame {
        header: FrameHeader::new(Direction::Receive, NvmeControllerData::LEN as u32),
        io: FrameIo::NvmeAdmin(cmd),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NvmeEncoder;

impl FrameEncoder for NvmeEncoder {
    fn kind(&self) -> TransportKind {
        TransportKind::Nvme
    }

    fn encode(&self, cmd: &SecurityCommand<'_>) -> Result<Frame, DispatchError> {
        let len = dxfer_len(TransportKind::Nvme, cmd.len())?;

        let mut sqe = NvmeCommand::default();
        fill_security(
            &mut sqe,
            security_opcode(cmd.direction),
            cmd.protocol,
            cmd.com_id,
            len,
        );

        Ok(Frame {
            header: FrameHeader::new(cmd.direction, len),
            io: FrameIo::NvmeAdmin(sqe),
        })
    }
}
