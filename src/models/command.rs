// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use core::fmt;

/// Logical block size used by the ATA/SCSI transfer-length encodings.
pub const BLOCK_SIZE: usize = 512;

/// Direction of a security-protocol transfer (IF_SEND / IF_RECV).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// IF_SEND: host to device (data-out).
    Send,
    /// IF_RECV: device to host (data-in).
    Receive,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Send => "IF_SEND",
            Direction::Receive => "IF_RECV",
        })
    }
}

/// One security-protocol transfer. The buffer is in/out: it carries the
/// payload for [`Direction::Send`] and receives the device's answer for
/// [`Direction::Receive`].
pub struct SecurityCommand<'a> {
    pub direction: Direction,
    pub protocol: u8,
    pub com_id: u16,
    pub buffer: &'a mut [u8],
}

impl<'a> SecurityCommand<'a> {
    pub fn new(
        direction: Direction,
        protocol: u8,
        com_id: u16,
        buffer: &'a mut [u8],
    ) -> Self {
        Self {
            direction,
            protocol,
            com_id,
            buffer,
        }
    }

    #[inline]
    pub fn receive(protocol: u8, com_id: u16, buffer: &'a mut [u8]) -> Self {
        Self::new(Direction::Receive, protocol, com_id, buffer)
    }

    #[inline]
    pub fn send(protocol: u8, com_id: u16, buffer: &'a mut [u8]) -> Self {
        Self::new(Direction::Send, protocol, com_id, buffer)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl fmt::Debug for SecurityCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityCommand")
            .field("direction", &self.direction)
            .field("protocol", &format_args!("{:#04x}", self.protocol))
            .field("com_id", &format_args!("{:#06x}", self.com_id))
            .field("len", &self.buffer.len())
            .finish()
    }
}
