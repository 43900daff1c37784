// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use tcg_passthrough_rs::{
    cfg::{
        cli::{Cli, Command, resolve_config_path},
        config::Config,
        logger::init_logger,
    },
    client::sim::SimulatedOpener,
    handlers::{query::query, scan::scan},
};
use tokio::{main, task};
use tracing::info;

#[main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard = init_logger(cli.log_config.as_deref().map(Path::new))?;

    let config = resolve_config_path(&cli.config)
        .and_then(Config::load_from_file)
        .context("failed to resolve or load config")?;

    let opener = Arc::new(SimulatedOpener::from_config(&config)?);
    info!(devices = config.devices.len(), "configuration loaded");

    match &cli.command {
        Command::Scan => {
            let entries = scan(
                Arc::clone(&opener),
                config.device_paths(),
                config.runtime.max_parallel_probes,
            )
            .await?;
            println!("Scanning for Opal compliant disks");
            for entry in entries {
                println!("{entry}");
            }
        },
        Command::Query { device, .. } => {
            let len = cli.command.discovery0_length(config.runtime.discovery0_length);
            let device = device.clone();
            let report = task::spawn_blocking(move || query(opener.as_ref(), &device, len))
                .await
                .context("query task panicked")??;
            print!("{report}");
        },
    }

    Ok(())
}
