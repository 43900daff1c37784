//! This module defines the data structures exchanged with the passthrough
//! layer: transport kinds, command frames, completion statuses and device
//! identification.

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Transport-neutral security-protocol command.
pub mod command;
/// Reply to the device-type inquiry.
pub mod device_type;
/// Command frames as handed to the passthrough layer.
pub mod frame;
/// Zero-copy views over INQUIRY / IDENTIFY payloads.
pub mod identify_data;
/// Normalized disk identity.
pub mod identity;
/// Completion status codes.
pub mod status;
/// Transport kinds and raw protocol codes.
pub mod transport;
