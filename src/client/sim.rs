// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! In-process passthrough backend.
//!
//! Each device reference is answered from a [`SimulatedDisk`] fixture: the
//! device-type inquiry is synthesized from the fixture's identity strings,
//! NVMe Identify Controller is answered from the same strings and security
//! receives are filled from a canned response. Every submitted frame is
//! recorded so callers can inspect exactly what went to the "hardware".

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::Result;

use crate::{
    cfg::config::{Config, DeviceConfig},
    client::passthrough::{Passthrough, PassthroughOpener, TransportError},
    control_block::nvme::ADMIN_IDENTIFY,
    models::{
        command::Direction,
        device_type::DeviceTypeReply,
        frame::Frame,
        identify_data::{AtaIdentifyRaw, NvmeControllerData, ScsiInquiryRaw},
        identity::bounded_copy,
        status::CompletionStatus,
        transport::{TransportKind, proto},
    },
};

/// Copy `src` into `dst`, padding the remainder with ASCII spaces the way
/// INQUIRY and IDENTIFY string fields are padded.
fn put_padded(dst: &mut [u8], src: &[u8]) {
    let n = dst.len().min(src.len());
    dst[..n].copy_from_slice(&src[..n]);
    dst[n..].fill(b' ');
}

/// What a simulated device reports and how it behaves.
#[derive(Debug, Clone)]
pub struct SimulatedDisk {
    /// Raw protocol code returned by the device-type inquiry.
    pub protocol: u32,
    pub serial: Vec<u8>,
    pub firmware: Vec<u8>,
    pub model: Vec<u8>,
    pub nvme_admin: bool,
    pub fail_inquiry: bool,
    pub fail_submit: bool,
    /// Completion status of every submitted frame.
    pub completion: CompletionStatus,
    /// Data returned by security-protocol receives.
    pub security_response: Vec<u8>,
}

impl SimulatedDisk {
    pub fn new(kind: TransportKind) -> Self {
        Self {
            protocol: kind.raw(),
            serial: Vec::new(),
            firmware: Vec::new(),
            model: Vec::new(),
            nvme_admin: true,
            fail_inquiry: false,
            fail_submit: false,
            completion: CompletionStatus::REQ_CMP,
            security_response: Vec::new(),
        }
    }

    pub fn ata(serial: &str, firmware: &str, model: &str) -> Self {
        Self::new(TransportKind::Ata).with_identity(serial, firmware, model)
    }

    pub fn scsi(serial: &str, firmware: &str, model: &str) -> Self {
        Self::new(TransportKind::Scsi).with_identity(serial, firmware, model)
    }

    pub fn nvme(serial: &str, firmware: &str, model: &str) -> Self {
        Self::new(TransportKind::Nvme).with_identity(serial, firmware, model)
    }

    pub fn with_identity(mut self, serial: &str, firmware: &str, model: &str) -> Self {
        self.serial = serial.as_bytes().to_vec();
        self.firmware = firmware.as_bytes().to_vec();
        self.model = model.as_bytes().to_vec();
        self
    }

    pub fn with_security_response(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.security_response = data.into();
        self
    }

    pub fn with_completion(mut self, status: CompletionStatus) -> Self {
        self.completion = status;
        self
    }

    pub fn with_nvme_admin(mut self, nvme_admin: bool) -> Self {
        self.nvme_admin = nvme_admin;
        self
    }

    pub fn failing_inquiry(mut self) -> Self {
        self.fail_inquiry = true;
        self
    }

    pub fn failing_submit(mut self) -> Self {
        self.fail_submit = true;
        self
    }

    /// Build the fixture for a configured device; `None` for `Absent`.
    pub fn from_config(dev: &DeviceConfig) -> Result<Option<Self>> {
        let Some(kind) = dev.transport.kind() else {
            return Ok(None);
        };
        let mut disk = Self::new(kind)
            .with_identity(
                &dev.serial_number,
                &dev.firmware_revision,
                &dev.model_number,
            )
            .with_completion(dev.completion_status)
            .with_nvme_admin(dev.nvme_admin.as_bool())
            .with_security_response(dev.discovery0()?);
        disk.fail_inquiry = dev.fail_inquiry.as_bool();
        disk.fail_submit = dev.fail_submit.as_bool();
        Ok(Some(disk))
    }

    fn device_type_reply(&self) -> DeviceTypeReply {
        let mut reply = DeviceTypeReply {
            status: CompletionStatus::REQ_CMP,
            protocol: self.protocol,
            serial_num: self.serial.clone(),
            ..Default::default()
        };
        match self.protocol {
            proto::SCSI => reply.inq_data = self.inquiry_data(),
            proto::ATA => reply.ident_data = self.identify_data(),
            _ => {},
        }
        reply
    }

    fn inquiry_data(&self) -> Vec<u8> {
        let mut b = vec![0u8; ScsiInquiryRaw::LEN];
        // direct access block device, SPC-4, response format 2
        b[2] = 0x06;
        b[3] = 0x02;
        b[4] = (ScsiInquiryRaw::LEN - 5) as u8;
        put_padded(&mut b[ScsiInquiryRaw::VENDOR_PRODUCT], &self.model);
        put_padded(&mut b[32..36], &self.firmware);
        b
    }

    fn identify_data(&self) -> Vec<u8> {
        let mut b = vec![0u8; AtaIdentifyRaw::LEN];
        put_padded(&mut b[20..40], &self.serial);
        put_padded(&mut b[46..54], &self.firmware);
        put_padded(&mut b[54..94], &self.model);
        b
    }

    fn controller_data(&self) -> Vec<u8> {
        let mut b = vec![0u8; NvmeControllerData::LEN];
        put_padded(&mut b[4..24], &self.serial);
        put_padded(&mut b[24..64], &self.model);
        put_padded(&mut b[64..72], &self.firmware);
        b
    }
}

/// Passthrough session over a [`SimulatedDisk`].
#[derive(Debug)]
pub struct SimulatedPassthrough {
    disk: SimulatedDisk,
    submitted: Arc<Mutex<Vec<Frame>>>,
    closed: Arc<AtomicBool>,
}

impl SimulatedPassthrough {
    pub fn new(disk: SimulatedDisk) -> Self {
        Self {
            disk,
            submitted: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn disk(&self) -> &SimulatedDisk {
        &self.disk
    }

    /// Frames submitted so far, oldest first.
    pub fn submitted(&self) -> Vec<Frame> {
        self.submitted
            .lock()
            .map(|frames| frames.clone())
            .unwrap_or_default()
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.submitted().last().copied()
    }

    /// Shared view of the submission log that outlives the session.
    pub fn submission_log(&self) -> Arc<Mutex<Vec<Frame>>> {
        Arc::clone(&self.submitted)
    }

    /// Set once the session has been closed; outlives the session.
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn record(&self, frame: &Frame) {
        if let Ok(mut frames) = self.submitted.lock() {
            frames.push(*frame);
        }
    }
}

impl Passthrough for SimulatedPassthrough {
    fn get_device_type(&mut self) -> Result<DeviceTypeReply, TransportError> {
        if self.disk.fail_inquiry {
            return Err(TransportError::Rejected(
                "device type inquiry not answered".into(),
            ));
        }
        Ok(self.disk.device_type_reply())
    }

    fn submit(
        &mut self,
        frame: &Frame,
        data: &mut [u8],
    ) -> Result<CompletionStatus, TransportError> {
        self.record(frame);
        if self.disk.fail_submit {
            return Err(TransportError::Rejected("command queue unavailable".into()));
        }
        if !self.disk.completion.is_completed() {
            return Ok(self.disk.completion);
        }

        match frame.nvme() {
            Some(sqe) if sqe.opc == ADMIN_IDENTIFY => {
                bounded_copy(data, &self.disk.controller_data());
            },
            _ if frame.header.direction() == Some(Direction::Receive) => {
                bounded_copy(data, &self.disk.security_response);
            },
            _ => {},
        }
        Ok(CompletionStatus::REQ_CMP)
    }

    fn nvme_admin(&self) -> bool {
        self.disk.nvme_admin
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// Opens [`SimulatedPassthrough`] sessions by device reference.
#[derive(Debug, Clone, Default)]
pub struct SimulatedOpener {
    disks: HashMap<String, SimulatedDisk>,
}

impl SimulatedOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_disk(mut self, devref: impl Into<String>, disk: SimulatedDisk) -> Self {
        self.insert(devref, disk);
        self
    }

    pub fn insert(&mut self, devref: impl Into<String>, disk: SimulatedDisk) {
        self.disks.insert(devref.into(), disk);
    }

    /// One fixture per configured device; `Absent` devices are left out so
    /// opening them fails.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let mut opener = Self::new();
        for dev in &cfg.devices {
            if let Some(disk) = SimulatedDisk::from_config(dev)? {
                opener.insert(dev.path.clone(), disk);
            }
        }
        Ok(opener)
    }

    /// Known device references, sorted.
    pub fn devrefs(&self) -> Vec<String> {
        let mut refs: Vec<String> = self.disks.keys().cloned().collect();
        refs.sort();
        refs
    }
}

impl PassthroughOpener for SimulatedOpener {
    type Handle = SimulatedPassthrough;

    fn open(&self, devref: &str) -> Result<Self::Handle, TransportError> {
        self.disks
            .get(devref)
            .cloned()
            .map(SimulatedPassthrough::new)
            .ok_or_else(|| TransportError::Open {
                devref: devref.to_string(),
                reason: "no such device".into(),
            })
    }
}
