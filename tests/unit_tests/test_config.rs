use anyhow::{Context, Result};
use tcg_passthrough_rs::{
    cfg::{
        cli::resolve_config_path,
        config::Config,
        enums::{TransportName, YesNo},
        logger::{LogConfig, LogOutput},
    },
    client::{
        passthrough::{PassthroughOpener, TransportError},
        sim::SimulatedOpener,
    },
    models::transport::TransportKind,
};

fn load() -> Result<Config> {
    resolve_config_path("tests/config.yaml")
        .and_then(Config::load_from_file)
        .context("failed to resolve or load config")
}

#[test]
fn test_config_devices() -> Result<()> {
    let cfg = load()?;

    assert_eq!(
        cfg.device_paths(),
        vec!["/dev/ada0", "/dev/da0", "/dev/nvme0", "/dev/cd0", "/dev/ada9"]
    );
    assert_eq!(cfg.runtime.discovery0_length, 2048);
    assert_eq!(cfg.runtime.max_parallel_probes, 2);

    let da0 = cfg.device("/dev/da0").expect("WTF");
    assert_eq!(da0.transport, TransportName::Scsi);
    assert_eq!(da0.transport.kind(), Some(TransportKind::Scsi));
    assert_eq!(da0.firmware_revision, "0004");
    assert_eq!(da0.nvme_admin, YesNo::Yes);

    let ada0 = cfg.device("/dev/ada0").expect("WTF");
    let d0 = ada0.discovery0()?;
    assert_eq!(d0.len(), 48);
    assert_eq!(&d0[..8], &[0, 0, 0, 0x30, 0, 0, 0, 1]);

    assert_eq!(cfg.device("/dev/ada9").expect("WTF").transport.kind(), None);
    Ok(())
}

#[test]
fn test_opener_from_config() -> Result<()> {
    let cfg = load()?;
    let opener = SimulatedOpener::from_config(&cfg)?;

    assert_eq!(
        opener.devrefs(),
        vec!["/dev/ada0", "/dev/cd0", "/dev/da0", "/dev/nvme0"]
    );

    let ada0 = opener.open("/dev/ada0")?;
    assert_eq!(ada0.disk().security_response.len(), 48);

    match opener.open("/dev/ada9") {
        Err(TransportError::Open { devref, .. }) => assert_eq!(devref, "/dev/ada9"),
        other => panic!("absent device opened: {other:?}"),
    }
    Ok(())
}

#[test]
fn test_logger_config() -> Result<()> {
    let log = LogConfig::load_from_file("tests/config_logger.yaml")?;
    assert_eq!(log.level, "trace");
    assert_eq!(log.output, LogOutput::Stderr);
    assert!(log.is_show_line);
    assert!(!log.is_show_target);
    assert!(log.file.is_none());
    Ok(())
}
