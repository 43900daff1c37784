use std::sync::atomic::Ordering;

use anyhow::Result;
use tcg_passthrough_rs::{
    client::{
        device::SedDevice,
        sim::{SimulatedDisk, SimulatedOpener, SimulatedPassthrough},
    },
    control_block::{
        DispatchError, NVME_PASSTHROUGH,
        ata::{DEVICE_LBA, TRUSTED_RECEIVE, TRUSTED_SEND},
        nvme::{ADMIN_IDENTIFY, ADMIN_SECURITY_SEND},
    },
    models::{
        command::SecurityCommand,
        frame::FrameFlags,
        identity::{DeviceType, DiskIdentity},
        status::CompletionStatus,
        transport::{TransportKind, proto},
    },
};

fn device(disk: SimulatedDisk) -> SedDevice<SimulatedPassthrough> {
    SedDevice::from_handle("/dev/pass0", SimulatedPassthrough::new(disk))
}

fn wd_red() -> SimulatedDisk {
    SimulatedDisk::ata("WD-WCC4E0000001", "82.00A82", "WDC WD40EFRX-68N32N0")
}

#[test]
fn test_ata_identify_and_receive() -> Result<()> {
    let mut dev = device(wd_red().with_security_response(vec![0x10; 64]));

    let id = dev.identify();
    assert_eq!(id.device_type, DeviceType::Ata);
    assert_eq!(id.serial(), "WD-WCC4E0000001");
    assert_eq!(id.firmware(), "82.00A82");
    assert_eq!(id.model(), "WDC WD40EFRX-68N32N0");
    assert_eq!(dev.transport_kind(), TransportKind::Ata);
    // ATA identity comes from the inquiry reply alone
    assert!(dev.handle().submitted().is_empty());

    let mut buf = vec![0xFFu8; 512];
    dev.send_cmd(SecurityCommand::receive(0x01, 0x0001, &mut buf))?;
    assert_eq!(&buf[..64], &[0x10; 64]);
    assert!(buf[64..].iter().all(|&b| b == 0));

    let frame = dev.handle().last_frame().expect("WTF");
    let tf = frame.ata().expect("WTF");
    assert_eq!(tf.command, TRUSTED_RECEIVE);
    assert_eq!(tf.features, 0x01);
    assert_eq!(tf.sector_count, 1);
    assert_eq!(tf.lba_low, 0);
    assert_eq!(tf.lba_mid, 0x01);
    assert_eq!(tf.lba_high, 0x00);
    assert_eq!(tf.device, DEVICE_LBA);
    assert_eq!(frame.header.dxfer_len, 512);
    assert!(frame.header.flags.contains(FrameFlags::DIR_IN));
    Ok(())
}

#[test]
fn test_ata_send() -> Result<()> {
    let mut dev = device(wd_red());
    dev.identify();

    let mut payload = vec![0xA5u8; 1024];
    dev.send_cmd(SecurityCommand::send(0x01, 0x07FE, &mut payload))?;
    // send leaves the buffer alone
    assert!(payload.iter().all(|&b| b == 0xA5));

    let frame = dev.handle().last_frame().expect("WTF");
    let tf = frame.ata().expect("WTF");
    assert_eq!(tf.command, TRUSTED_SEND);
    assert_eq!(tf.sector_count, 2);
    assert_eq!(tf.lba_mid, 0xFE);
    assert_eq!(tf.lba_high, 0x07);
    assert!(frame.header.flags.contains(FrameFlags::DIR_OUT));
    Ok(())
}

#[test]
fn test_scsi_identity_from_inquiry() -> Result<()> {
    let mut dev = device(SimulatedDisk::scsi(
        "Z1Z0ABCD0000000000000000000000",
        "0004",
        "SEAGATE ST4000NM0063",
    ));

    let id = dev.identify();
    assert_eq!(id.device_type, DeviceType::Sas);
    // serial is cut to its 20-byte field
    assert_eq!(id.serial(), "Z1Z0ABCD000000000000");
    assert_eq!(id.firmware(), "0004");
    assert_eq!(id.model(), "SEAGATE ST4000NM0063");
    assert_eq!(&id.firmware_revision[4..], &[0; 4]);
    assert_eq!(&id.model_number[24..], &[0; 16]);

    let d0 = dev.discovery0(2048)?;
    assert_eq!(d0.len(), 2048);
    let frame = dev.handle().last_frame().expect("WTF");
    assert_eq!(frame.command_bytes().len(), 12);
    Ok(())
}

#[test]
fn test_nvme_identify_controller() -> Result<()> {
    let mut dev = device(SimulatedDisk::nvme(
        "S4EWNX0R123456",
        "2B2QEXM7",
        "Samsung SSD 970 EVO Plus 1TB",
    ));
    let id = dev.identify();

    if !NVME_PASSTHROUGH {
        assert_eq!(id, DiskIdentity::unknown());
        return Ok(());
    }

    assert_eq!(id.device_type, DeviceType::Nvme);
    assert_eq!(id.serial(), "S4EWNX0R123456");
    assert_eq!(id.firmware(), "2B2QEXM7");
    assert_eq!(id.model(), "Samsung SSD 970 EVO Plus 1TB");

    let identify = dev.handle().last_frame().expect("WTF");
    let sqe = identify.nvme().expect("WTF");
    assert_eq!(sqe.opc, ADMIN_IDENTIFY);
    assert_eq!(sqe.cdw10.get(), 1);
    assert_eq!(identify.header.dxfer_len, 4096);

    let mut payload = vec![0u8; 100];
    dev.send_cmd(SecurityCommand::send(0x01, 0x0001, &mut payload))?;
    let frame = dev.handle().last_frame().expect("WTF");
    let sqe = frame.nvme().expect("WTF");
    assert_eq!(sqe.opc, ADMIN_SECURITY_SEND);
    assert_eq!(sqe.cdw11.get(), 100);
    Ok(())
}

#[test]
fn test_nvme_identify_failure_is_unknown() {
    let disk = SimulatedDisk::nvme("S1", "F1", "M1").with_completion(CompletionStatus::REQ_CMP_ERR);
    let mut dev = device(disk);
    assert_eq!(dev.identify(), DiskIdentity::unknown());
}

#[test]
fn test_nvme_without_admin_passthrough() {
    let mut dev = device(SimulatedDisk::nvme("S1", "F1", "M1").with_nvme_admin(false));

    assert_eq!(dev.identify(), DiskIdentity::unknown());
    assert_eq!(dev.transport_kind(), TransportKind::Nvme);

    let mut buf = vec![0u8; 512];
    let err = dev
        .send_cmd(SecurityCommand::receive(0x01, 0x0001, &mut buf))
        .expect_err("WTF");
    assert!(matches!(
        err,
        DispatchError::TransportUnavailable(TransportKind::Nvme)
    ));
    assert!(dev.handle().submitted().is_empty());
}

#[test]
fn test_non_responding_device() {
    let mut dev = device(wd_red().failing_inquiry());

    let id = dev.identify();
    assert_eq!(id.device_type, DeviceType::Other);
    assert_eq!(id.serial_number, [0; 20]);
    assert_eq!(id.firmware_revision, [0; 8]);
    assert_eq!(id.model_number, [0; 40]);
    assert_eq!(dev.transport_kind(), TransportKind::Unspecified);

    let mut buf = vec![0u8; 512];
    assert!(matches!(
        dev.send_cmd(SecurityCommand::receive(0x01, 0x0001, &mut buf)),
        Err(DispatchError::NotIdentified)
    ));
}

#[test]
fn test_dispatch_before_identify() {
    let mut dev = device(wd_red());
    let mut buf = vec![0u8; 512];
    assert!(matches!(
        dev.send_cmd(SecurityCommand::receive(0x01, 0x0001, &mut buf)),
        Err(DispatchError::NotIdentified)
    ));
    assert!(dev.handle().submitted().is_empty());
}

#[test]
fn test_unsupported_transports() {
    for kind in [TransportKind::Other(proto::ATAPI), TransportKind::Unspecified] {
        let mut dev = device(SimulatedDisk::new(kind));
        assert_eq!(dev.identify(), DiskIdentity::unknown());
        assert_eq!(dev.transport_kind(), kind);

        let mut buf = vec![0u8; 512];
        match dev.send_cmd(SecurityCommand::receive(0x01, 0x0001, &mut buf)) {
            Err(DispatchError::UnsupportedTransport(k)) => assert_eq!(k, kind),
            other => panic!("unexpected dispatch result: {other:?}"),
        }
    }
}

#[test]
fn test_completion_and_submit_failures() {
    let mut dev = device(wd_red().with_completion(CompletionStatus::ATA_STATUS_ERROR));
    dev.identify();
    let mut buf = vec![0u8; 512];
    match dev.send_cmd(SecurityCommand::receive(0x01, 0x0001, &mut buf)) {
        Err(DispatchError::Completion(status)) => {
            assert_eq!(status, CompletionStatus::ATA_STATUS_ERROR)
        },
        other => panic!("unexpected dispatch result: {other:?}"),
    }
    // the failing frame still reached the passthrough layer
    assert_eq!(dev.handle().submitted().len(), 1);

    let mut dev = device(wd_red().failing_submit());
    dev.identify();
    assert!(matches!(
        dev.send_cmd(SecurityCommand::receive(0x01, 0x0001, &mut buf)),
        Err(DispatchError::Submit(_))
    ));
}

#[test]
fn test_invalid_length_is_not_submitted() {
    let mut dev = device(wd_red());
    dev.identify();
    let mut buf = vec![0u8; 100];
    assert!(matches!(
        dev.send_cmd(SecurityCommand::receive(0x01, 0x0001, &mut buf)),
        Err(DispatchError::InvalidLength {
            transport: TransportKind::Ata,
            len: 100
        })
    ));
    assert!(dev.handle().submitted().is_empty());
}

#[test]
fn test_identify_twice_keeps_binding() {
    let mut dev = device(wd_red());
    let first = dev.identify();
    let second = dev.identify();
    assert_eq!(first, second);
    assert_eq!(dev.transport_kind(), TransportKind::Ata);
}

#[test]
fn test_session_closed_on_drop() -> Result<()> {
    let opener = SimulatedOpener::new().with_disk("/dev/ada0", wd_red());
    let dev = SedDevice::open(&opener, "/dev/ada0")?;
    assert_eq!(dev.devref(), "/dev/ada0");

    let closed = dev.handle().closed_flag();
    assert!(!closed.load(Ordering::Acquire));
    drop(dev);
    assert!(closed.load(Ordering::Acquire));

    assert!(SedDevice::open(&opener, "/dev/ada1").is_err());
    Ok(())
}
