use std::fs;

use anyhow::Result;
use hex::FromHex;
use tcg_passthrough_rs::{
    control_block::{
        DispatchError, FrameEncoder, NVME_PASSTHROUGH, TransportBinding,
        ata::{TRUSTED_RECEIVE, TRUSTED_SEND},
        nvme::{ADMIN_SECURITY_RECEIVE, ADMIN_SECURITY_SEND},
        scsi::{
            SECURITY_PROTOCOL_IN, SECURITY_PROTOCOL_OUT, security_protocol_blocks,
            security_protocol_com_id,
        },
    },
    models::{
        command::{Direction, SecurityCommand},
        frame::{COMMAND_TIMEOUT, Frame, FrameFlags, TagAction},
        transport::TransportKind,
    },
};

fn load_fixture(path: &str) -> Result<Vec<u8>> {
    let s = fs::read_to_string(path)?;
    let cleaned = s.trim().replace(|c: char| c.is_whitespace(), "");
    Ok(Vec::from_hex(&cleaned)?)
}

fn encode(
    kind: TransportKind,
    direction: Direction,
    protocol: u8,
    com_id: u16,
    len: usize,
) -> Result<Frame, DispatchError> {
    let mut buf = vec![0u8; len];
    let cmd = SecurityCommand::new(direction, protocol, com_id, &mut buf);
    TransportBinding::select(kind, true).encoder()?.encode(&cmd)
}

#[test]
fn test_opcodes_per_transport_and_direction() -> Result<()> {
    let mut table = vec![
        (TransportKind::Ata, Direction::Receive, TRUSTED_RECEIVE),
        (TransportKind::Ata, Direction::Send, TRUSTED_SEND),
        (TransportKind::Scsi, Direction::Receive, SECURITY_PROTOCOL_IN),
        (TransportKind::Scsi, Direction::Send, SECURITY_PROTOCOL_OUT),
    ];
    if NVME_PASSTHROUGH {
        table.push((TransportKind::Nvme, Direction::Receive, ADMIN_SECURITY_RECEIVE));
        table.push((TransportKind::Nvme, Direction::Send, ADMIN_SECURITY_SEND));
    }

    for (kind, direction, opcode) in table {
        let frame = encode(kind, direction, 0x01, 0x0001, 512)?;
        assert_eq!(frame.transport(), kind);
        assert_eq!(frame.opcode(), opcode, "{kind} {direction}");
        assert_eq!(frame.header.direction(), Some(direction));
        assert!(frame.header.flags.contains(FrameFlags::DEV_QFRZDIS));
        assert_eq!(frame.header.tag_action, TagAction::Simple);
        assert_eq!(frame.header.timeout, COMMAND_TIMEOUT);
        assert_eq!(frame.header.dxfer_len, 512);
    }
    Ok(())
}

#[test]
fn test_scsi_security_in_cdb() -> Result<()> {
    let expected = load_fixture("tests/unit_tests/fixtures/scsi_security_in_discovery0.hex")?;

    let frame = encode(TransportKind::Scsi, Direction::Receive, 0x01, 0x0001, 2048)?;
    let io = frame.scsi().expect("WTF");
    assert_eq!(frame.command_bytes(), expected.as_slice());
    assert_eq!(io.sense_len, 252);
    Ok(())
}

#[test]
fn test_block_count_round_trips() -> Result<()> {
    for len in [0usize, 512, 1024, 2048, 64 * 1024] {
        let ata = encode(TransportKind::Ata, Direction::Receive, 0x01, 0x07FE, len)?;
        let tf = ata.ata().expect("WTF");
        assert_eq!(usize::from(tf.transfer_blocks()) * 512, len);
        assert_eq!(tf.com_id(), 0x07FE);

        let scsi = encode(TransportKind::Scsi, Direction::Send, 0x02, 0x07FE, len)?;
        let cdb = scsi.scsi().expect("WTF").cdb;
        assert_eq!(security_protocol_blocks(&cdb) as usize * 512, len);
        assert_eq!(security_protocol_com_id(&cdb), 0x07FE);
    }
    Ok(())
}

#[test]
fn test_nvme_carries_raw_byte_count() -> Result<()> {
    if !NVME_PASSTHROUGH {
        return Ok(());
    }
    let frame = encode(TransportKind::Nvme, Direction::Send, 0x01, 0x0001, 100)?;
    let sqe = frame.nvme().expect("WTF");
    assert_eq!(sqe.cdw10.get(), (0x01 << 24) | (0x0001 << 8));
    assert_eq!(sqe.cdw11.get(), 100);
    assert_eq!(frame.header.dxfer_len, 100);
    Ok(())
}

#[test]
fn test_block_transports_reject_partial_blocks() {
    for kind in [TransportKind::Ata, TransportKind::Scsi] {
        assert!(matches!(
            encode(kind, Direction::Receive, 0x01, 0x0001, 513),
            Err(DispatchError::InvalidLength { len: 513, .. })
        ));
    }
}

#[test]
fn test_unbound_transports_do_not_encode() {
    assert!(matches!(
        encode(TransportKind::Unspecified, Direction::Receive, 1, 1, 512),
        Err(DispatchError::UnsupportedTransport(TransportKind::Unspecified))
    ));
    assert!(matches!(
        encode(TransportKind::Other(4), Direction::Send, 1, 1, 512),
        Err(DispatchError::UnsupportedTransport(TransportKind::Other(4)))
    ));
}

#[test]
fn test_frame_display_summarises_command() -> Result<()> {
    let frame = encode(TransportKind::Ata, Direction::Receive, 0x01, 0x0001, 512)?;
    let s = frame.to_string();
    assert!(s.starts_with("ATA opcode=0x5c dir=IN len=512"), "{s}");
    Ok(())
}
