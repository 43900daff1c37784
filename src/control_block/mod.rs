// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Security-protocol frame encoders, one per transport.
//!
//! The encoder for a device is picked once, when the transport is
//! discovered, and stored as a [`TransportBinding`]. Every later transfer
//! goes through [`FrameEncoder::encode`] on that stored variant.

pub mod ata;
pub mod nvme;
pub mod scsi;

use enum_dispatch::enum_dispatch;
use thiserror::Error;

use crate::{
    client::passthrough::TransportError,
    control_block::{ata::AtaEncoder, nvme::NvmeEncoder, scsi::ScsiEncoder},
    models::{
        command::{BLOCK_SIZE, SecurityCommand},
        frame::Frame,
        status::CompletionStatus,
        transport::TransportKind,
    },
};

/// NVMe admin passthrough compiled into this build (`nvme` feature).
pub const NVME_PASSTHROUGH: bool = cfg!(feature = "nvme");

/// Failure of a security-protocol dispatch. Callers get a single failure
/// channel; the raw completion detail goes to the trace log.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("transport not identified")]
    NotIdentified,
    #[error("unsupported transport: {0}")]
    UnsupportedTransport(TransportKind),
    #[error("{0} passthrough is not available on this build")]
    TransportUnavailable(TransportKind),
    #[error("invalid {transport} transfer length: {len} bytes")]
    InvalidLength { transport: TransportKind, len: usize },
    #[error("passthrough submit failed: {0}")]
    Submit(#[from] TransportError),
    #[error("command completed with status {0}")]
    Completion(CompletionStatus),
}

/// Turns a transport-neutral [`SecurityCommand`] into a transport frame.
#[enum_dispatch]
pub trait FrameEncoder {
    fn kind(&self) -> TransportKind;
    fn encode(&self, cmd: &SecurityCommand<'_>) -> Result<Frame, DispatchError>;
}

#[enum_dispatch(FrameEncoder)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEncoder {
    Scsi(ScsiEncoder),
    Ata(AtaEncoder),
    Nvme(NvmeEncoder),
}

/// Outcome of transport discovery, fixed for the life of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportBinding {
    Bound(TransportEncoder),
    /// Known transport the passthrough layer cannot carry on this build.
    Unavailable(TransportKind),
    Unsupported(TransportKind),
}

impl TransportBinding {
    /// `nvme_admin` is whether the passthrough layer can carry NVMe admin
    /// commands; it is ANDed with [`NVME_PASSTHROUGH`].
    pub fn select(kind: TransportKind, nvme_admin: bool) -> Self {
        match kind {
            TransportKind::Scsi => Self::Bound(ScsiEncoder.into()),
            TransportKind::Ata => Self::Bound(AtaEncoder.into()),
            TransportKind::Nvme if NVME_PASSTHROUGH && nvme_admin => {
                Self::Bound(NvmeEncoder.into())
            },
            TransportKind::Nvme => Self::Unavailable(kind),
            other => Self::Unsupported(other),
        }
    }

    pub fn kind(&self) -> TransportKind {
        match self {
            Self::Bound(encoder) => encoder.kind(),
            Self::Unavailable(kind) | Self::Unsupported(kind) => *kind,
        }
    }

    pub fn encoder(&self) -> Result<TransportEncoder, DispatchError> {
        match self {
            Self::Bound(encoder) => Ok(*encoder),
            Self::Unavailable(kind) => Err(DispatchError::TransportUnavailable(*kind)),
            Self::Unsupported(kind) => Err(DispatchError::UnsupportedTransport(*kind)),
        }
    }
}

/// Transports a device can be bound to, given the passthrough capability.
pub fn supported_transports(nvme_admin: bool) -> Vec<TransportKind> {
    [TransportKind::Ata, TransportKind::Scsi, TransportKind::Nvme]
        .into_iter()
        .filter(|&kind| {
            matches!(
                TransportBinding::select(kind, nvme_admin),
                TransportBinding::Bound(_)
            )
        })
        .collect()
}

/// Transfer length in 512-byte blocks; the byte length must be an exact
/// multiple and the count must fit `max_blocks`.
pub(crate) fn block_count(
    transport: TransportKind,
    len: usize,
    max_blocks: u32,
) -> Result<u32, DispatchError> {
    if !len.is_multiple_of(BLOCK_SIZE) {
        return Err(DispatchError::InvalidLength { transport, len });
    }
    u32::try_from(len / BLOCK_SIZE)
        .ok()
        .filter(|&blocks| blocks <= max_blocks)
        .ok_or(DispatchError::InvalidLength { transport, len })
}

/// Byte length as carried in the frame header.
pub(crate) fn dxfer_len(transport: TransportKind, len: usize) -> Result<u32, DispatchError> {
    u32::try_from(len).map_err(|_| DispatchError::InvalidLength { transport, len })
}
