//! Command/response engine tests over a scripted in-memory bus.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use gnss_fix::packets::cfg_val::{self, keys};
use gnss_fix::{
    CfgValue, DopQuality, Error, FrameError, GnssFixType, NavPvtValid, Outcome, UbxDevice,
    UbxFrame,
};

/// Behaves like the receiver's bus interface: every staged response is
/// served byte-for-byte once the device starts reading, and an exhausted
/// script reads as empty.
#[derive(Default)]
struct ScriptedBus {
    written: Vec<u8>,
    responses: VecDeque<Vec<u8>>,
    rx: VecDeque<u8>,
}

impl ScriptedBus {
    fn respond_with(mut self, bytes: Vec<u8>) -> Self {
        self.responses.push_back(bytes);
        self
    }

    fn respond_idle(self) -> Self {
        self.respond_with(vec![0xff; 6])
    }
}

impl io::Read for ScriptedBus {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.rx.is_empty() {
            if let Some(next) = self.responses.pop_front() {
                self.rx.extend(next);
            }
        }
        let n = buf.len().min(self.rx.len());
        for slot in buf.iter_mut().take(n) {
            *slot = self.rx.pop_front().unwrap();
        }
        Ok(n)
    }
}

impl io::Write for ScriptedBus {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn nav_pvt_payload() -> Vec<u8> {
    let mut p = vec![0u8; 92];
    p[4..6].copy_from_slice(&2025_u16.to_le_bytes());
    p[6] = 9; // month
    p[7] = 2; // day
    p[8] = 12;
    p[9] = 41;
    p[10] = 27;
    p[11] = 0b0000_0111; // date, time, fully resolved
    p[20] = 3; // 3D fix
    p[23] = 9; // satellites
    p[24..28].copy_from_slice(&13_233_440_i32.to_le_bytes());
    p[28..32].copy_from_slice(&436_191_675_i32.to_le_bytes());
    p[76..78].copy_from_slice(&97_u16.to_le_bytes());
    p
}

fn nav_pvt_response() -> Vec<u8> {
    UbxFrame::new(0x01, 0x07, nav_pvt_payload()).to_bytes()
}

#[test]
fn idle_bus_reads_as_no_response() {
    let bus = ScriptedBus::default().respond_idle();
    let mut device = UbxDevice::new(bus);
    let poll = UbxFrame::new(0x01, 0x07, Vec::new());
    let outcome = device.send(&poll).unwrap();
    assert_eq!(outcome, Outcome::NoResponse);

    // The poll itself must have gone out as a well-formed frame.
    let bus = device.into_inner();
    assert_eq!(bus.written, [0xb5, 0x62, 0x01, 0x07, 0x00, 0x00, 0x08, 0x19]);
}

#[test]
fn poll_fix_decodes_a_position_solution() {
    init_logs();
    let bus = ScriptedBus::default().respond_with(nav_pvt_response());
    let mut device = UbxDevice::new(bus);
    let fix = device.poll_fix(Duration::from_secs(5)).unwrap();

    assert_eq!(
        (
            fix.utc_time.hour,
            fix.utc_time.minute,
            fix.utc_time.second
        ),
        (12, 41, 27)
    );
    let date = fix.utc_time.date.unwrap();
    assert_eq!((date.year, date.month, date.day), (2025, 9, 2));
    assert_eq!(fix.num_satellites_used, 9);
    assert!((fix.position_dop - 0.97).abs() < 1e-9);
    assert_eq!(DopQuality::from_dop(fix.position_dop), DopQuality::Ideal);
    assert!((fix.longitude - 1.323_344).abs() < 1e-6);
    assert!((fix.latitude - 43.619_167_5).abs() < 1e-6);
    assert_eq!(fix.fix_type, GnssFixType::Fix3D);
    assert!(fix.valid.contains(NavPvtValid::VALID_DATE | NavPvtValid::VALID_TIME));
    assert!(fix.position_available);
    assert!(!fix.raw_text.is_empty());
}

#[test]
fn poll_fix_repolls_only_while_the_bus_is_idle() {
    let bus = ScriptedBus::default()
        .respond_idle()
        .respond_with(nav_pvt_response());
    let mut device = UbxDevice::new(bus);
    let fix = device.poll_fix(Duration::from_secs(5)).unwrap();
    assert_eq!(fix.num_satellites_used, 9);
}

#[test]
fn poll_fix_gives_up_at_the_deadline() {
    let bus = ScriptedBus::default().respond_idle();
    let mut device = UbxDevice::new(bus);
    let err = device.poll_fix(Duration::ZERO).unwrap_err();
    assert!(matches!(err, Error::TimedOut));
}

#[test]
fn nacked_config_write_is_a_typed_error() {
    let nak = UbxFrame::new(0x05, 0x01, vec![0x06, 0x8a]).to_bytes();
    let bus = ScriptedBus::default().respond_with(nak);
    let mut device = UbxDevice::new(bus);
    let err = device
        .set_config_item(keys::I2CINPROT_NMEA, CfgValue::Bool(false))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Nacked {
            class: 0x06,
            msg_id: 0x8a
        }
    ));
}

#[test]
fn acked_config_write_succeeds() {
    let ack = UbxFrame::new(0x05, 0x00, vec![0x06, 0x8a]).to_bytes();
    let bus = ScriptedBus::default().respond_with(ack);
    let mut device = UbxDevice::new(bus);
    device
        .set_config_item(keys::I2CINPROT_UBX, CfgValue::Bool(true))
        .unwrap();
}

#[test]
fn config_read_returns_the_echoed_value() {
    let mut payload = cfg_val::val_get_payload(keys::PM_OPERATEMODE, cfg_val::CfgLayers::RAM);
    payload.push(0x01);
    let response = UbxFrame::new(0x06, 0x8b, payload).to_bytes();
    let bus = ScriptedBus::default().respond_with(response);
    let mut device = UbxDevice::new(bus);
    let value = device.get_config_item(keys::PM_OPERATEMODE).unwrap();
    assert_eq!(value, CfgValue::U8(0x01));
}

#[test]
fn truncated_response_is_an_error_not_a_hang() {
    let mut bytes = nav_pvt_response();
    bytes.truncate(40);
    let bus = ScriptedBus::default().respond_with(bytes);
    let mut device = UbxDevice::new(bus);
    let poll = UbxFrame::new(0x01, 0x07, Vec::new());
    let err = device.send(&poll).unwrap_err();
    assert!(matches!(err, Error::Frame(FrameError::Truncated { .. })));
}

#[test]
fn corrupted_response_fails_checksum_validation() {
    let mut bytes = nav_pvt_response();
    bytes[30] ^= 0x40;
    let bus = ScriptedBus::default().respond_with(bytes);
    let mut device = UbxDevice::new(bus);
    let poll = UbxFrame::new(0x01, 0x07, Vec::new());
    let err = device.send(&poll).unwrap_err();
    assert!(matches!(
        err,
        Error::Frame(FrameError::ChecksumMismatch { .. })
    ));
}

#[test]
fn read_version_stores_the_strings() {
    let mut payload = vec![0u8; 40];
    payload[..12].copy_from_slice(b"ROM SPG 5.10");
    payload[30..38].copy_from_slice(b"000A0000");
    payload.extend_from_slice(b"FWVER=SPG 5.10\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0");
    let response = UbxFrame::new(0x0a, 0x04, payload).to_bytes();
    let bus = ScriptedBus::default().respond_with(response);
    let mut device = UbxDevice::new(bus);

    let (sw, hw) = device.read_version().unwrap();
    assert_eq!(sw, "ROM SPG 5.10");
    assert_eq!(hw, "000A0000");
    assert_eq!(device.version(), Some(("ROM SPG 5.10", "000A0000")));
    assert_eq!(device.version_extensions(), ["FWVER=SPG 5.10"]);
}

#[test]
fn power_mode_switch_survives_a_rejected_key() {
    init_logs();
    // Three CFG-PM items go out; the middle one gets nacked and is skipped.
    let bus = ScriptedBus::default()
        .respond_with(UbxFrame::new(0x05, 0x00, vec![0x06, 0x8a]).to_bytes())
        .respond_with(UbxFrame::new(0x05, 0x01, vec![0x06, 0x8a]).to_bytes())
        .respond_with(UbxFrame::new(0x05, 0x00, vec![0x06, 0x8a]).to_bytes());
    let mut device = UbxDevice::new(bus);
    device.set_power_mode(gnss_fix::PowerMode::OnOff).unwrap();
}
