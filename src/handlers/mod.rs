//! Operations the command-line tool performs on top of [`crate::client`].

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Identity plus Level 0 Discovery dump for a single device.
pub mod query;
/// Concurrent identification of many device references.
pub mod scan;
