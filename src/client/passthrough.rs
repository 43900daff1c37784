// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! The seam to the platform passthrough layer.
//!
//! Opening a device, carrying a fully formed [`Frame`] to the hardware and
//! reporting its completion all live behind these traits; this crate only
//! builds frames and interprets completions.

use thiserror::Error;

use crate::{
    control_block::NVME_PASSTHROUGH,
    models::{device_type::DeviceTypeReply, frame::Frame, status::CompletionStatus},
};

/// Transport-level failure: the frame never reached a completion status.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot open device {devref}: {reason}")]
    Open { devref: String, reason: String },
    #[error("passthrough rejected the request: {0}")]
    Rejected(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An open passthrough session to one device.
pub trait Passthrough {
    /// Ask the layer which transport the device speaks, together with the
    /// identification data it cached at attach time.
    fn get_device_type(&mut self) -> Result<DeviceTypeReply, TransportError>;

    /// Carry `frame` to the device and block until it completes or times
    /// out. `data` is the transfer buffer: read from for data-out frames,
    /// written into for data-in frames.
    fn submit(&mut self, frame: &Frame, data: &mut [u8])
    -> Result<CompletionStatus, TransportError>;

    /// Whether NVMe admin commands can be carried.
    fn nvme_admin(&self) -> bool {
        NVME_PASSTHROUGH
    }

    /// Release the session. Called once, on teardown.
    fn close(&mut self) {}
}

/// Opens passthrough sessions by device reference (`/dev/pass0`, ...).
pub trait PassthroughOpener {
    type Handle: Passthrough;

    fn open(&self, devref: &str) -> Result<Self::Handle, TransportError>;
}
