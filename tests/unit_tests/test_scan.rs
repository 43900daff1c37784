use std::sync::Arc;

use anyhow::{Context, Result};
use tcg_passthrough_rs::{
    cfg::{cli::resolve_config_path, config::Config},
    client::sim::SimulatedOpener,
    control_block::NVME_PASSTHROUGH,
    handlers::{query::query, scan::scan},
    models::{
        identity::DeviceType,
        transport::{TransportKind, proto},
    },
};

fn load() -> Result<(Config, Arc<SimulatedOpener>)> {
    let cfg = resolve_config_path("tests/config.yaml")
        .and_then(Config::load_from_file)
        .context("failed to resolve or load config")?;
    let opener = Arc::new(SimulatedOpener::from_config(&cfg)?);
    Ok((cfg, opener))
}

#[tokio::test]
async fn test_scan_configured_devices() -> Result<()> {
    let (cfg, opener) = load()?;

    let entries = scan(opener, cfg.device_paths(), cfg.runtime.max_parallel_probes).await?;
    let refs: Vec<&str> = entries.iter().map(|e| e.devref.as_str()).collect();
    assert_eq!(refs, cfg.device_paths());

    let ada0 = &entries[0];
    assert_eq!(ada0.transport, TransportKind::Ata);
    let id = ada0.identity.as_ref().expect("WTF");
    assert_eq!(id.device_type, DeviceType::Ata);
    assert_eq!(id.model(), "WDC WD40EFRX-68N32N0");

    let da0 = &entries[1];
    assert_eq!(
        da0.identity.as_ref().map(|id| id.device_type),
        Some(DeviceType::Sas)
    );

    let nvme0 = &entries[2];
    assert_eq!(nvme0.transport, TransportKind::Nvme);
    assert_eq!(nvme0.is_identified(), NVME_PASSTHROUGH);

    let cd0 = &entries[3];
    assert!(cd0.is_present());
    assert!(!cd0.is_identified());
    assert_eq!(cd0.transport, TransportKind::Other(proto::ATAPI));

    let ada9 = &entries[4];
    assert!(!ada9.is_present());
    assert!(ada9.to_string().ends_with("absent"));
    Ok(())
}

#[tokio::test]
async fn test_scan_single_permit() -> Result<()> {
    let (cfg, opener) = load()?;
    let entries = scan(opener, cfg.device_paths(), 1).await?;
    assert_eq!(entries.len(), cfg.devices.len());
    assert_eq!(entries.iter().filter(|e| e.is_present()).count(), 4);
    Ok(())
}

#[test]
fn test_query_reads_discovery0() -> Result<()> {
    let (cfg, opener) = load()?;

    let report = query(opener.as_ref(), "/dev/ada0", cfg.runtime.discovery0_length)?;
    assert_eq!(report.identity.device_type, DeviceType::Ata);
    assert_eq!(report.discovery0.len(), 2048);
    assert_eq!(report.discovery0_length(), Some(0x30));
    assert_eq!(&report.discovery0[32..36], &[0x00, 0x01, 0x10, 0x0c]);

    // partial blocks cannot be framed for ATA
    assert!(query(opener.as_ref(), "/dev/ada0", 1000).is_err());
    assert!(query(opener.as_ref(), "/dev/cd0", 2048).is_err());
    Ok(())
}
