//! This module manages passthrough sessions and the devices built on them.

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// A self-encrypting drive: transport discovery and security-protocol
/// dispatch.
pub mod device;
/// Traits the platform passthrough layer implements.
pub mod passthrough;
/// In-process passthrough backend answering from fixtures.
pub mod sim;
