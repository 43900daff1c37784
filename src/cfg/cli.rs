// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::client::device::DISCOVERY0_DEFAULT_LEN;

#[derive(Debug, Parser)]
#[command(name = "tcg-passthrough", version, about = "Probe self-encrypting drives")]
pub struct Cli {
    /// Device configuration (YAML).
    #[arg(short, long, default_value = "config.yaml")]
    pub config: String,

    /// Logger configuration (YAML with a `logger:` section).
    #[arg(long)]
    pub log_config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Identify every configured device.
    Scan,
    /// Identify one device and dump its Level 0 Discovery response.
    Query {
        device: String,
        /// Receive buffer length in bytes.
        #[arg(short, long)]
        length: Option<usize>,
    },
}

impl Command {
    pub fn discovery0_length(&self, configured: usize) -> usize {
        match self {
            Command::Query {
                length: Some(len), ..
            } => *len,
            Command::Query { .. } => configured,
            Command::Scan => DISCOVERY0_DEFAULT_LEN,
        }
    }
}

pub fn resolve_config_path(rel: &str) -> Result<PathBuf> {
    let p = Path::new(rel);

    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()
            .context("cannot get current working dir")?
            .join(p)
    };

    let canon = abs
        .canonicalize()
        .with_context(|| format!("failed to canonicalize path {abs:?}"))?;

    Ok(canon)
}
