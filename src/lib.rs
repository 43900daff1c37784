//! This crate frames TCG security-protocol transfers (IF_SEND / IF_RECV)
//! for ATA, SCSI and NVMe devices reached through a passthrough layer, and
//! identifies those devices.
// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Handles configuration, command-line parsing, and logging.
pub mod cfg;
/// Manages passthrough sessions and devices.
pub mod client;
/// Builds security-protocol command frames, one encoder per transport.
pub mod control_block;
/// Scan and query operations used by the command-line tool.
pub mod handlers;
/// Defines frames, statuses, identities and transport kinds.
pub mod models;
/// Provides utility functions used throughout the crate.
pub mod utils;
