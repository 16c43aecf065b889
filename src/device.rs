use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use crate::constants::{COMMAND_SETTLE_DELAY, UBX_CHECKSUM_LEN, UBX_HEADER_LEN, UBX_LENGTH_OFFSET};
use crate::error::{Error, FrameError, Result};
use crate::fix::PositionFix;
use crate::frame::UbxFrame;
use crate::packets::cfg_val::{self, CfgKey, CfgLayers, CfgValue};
use crate::packets::{ack, mon_ver, nav_pvt};
use crate::transport::UbxTransport;

/// How often to re-poll after an idle answer inside [`UbxDevice::poll_fix`].
const POLL_RECHECK_INTERVAL: Duration = Duration::from_millis(100);

/// What came back from one command round trip.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The receiver accepted the command. Carries the response frame when
    /// the answer was data rather than a bare acknowledge.
    Acked(Option<UbxFrame>),
    /// The receiver explicitly rejected the command.
    Nacked,
    /// The bus had nothing staged; the idle header came back.
    NoResponse,
}

/// Receiver operating mode driven over the CFG-PM keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    /// Continuous tracking.
    Normal,
    /// Duty-cycled on/off power save, woken over EXTINT.
    OnOff,
}

/// A session with the binary-protocol receiver generation.
///
/// Owns the transport for its lifetime and performs exactly one blocking
/// round trip per command. There are no internal retries; recoverable
/// failures surface as errors or as [`Outcome::NoResponse`] and the caller
/// decides what to do next.
pub struct UbxDevice<T> {
    transport: T,
    software_version: Option<String>,
    hardware_version: Option<String>,
    version_extensions: Vec<String>,
}

impl<T: UbxTransport> UbxDevice<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            software_version: None,
            hardware_version: None,
            version_extensions: Vec::new(),
        }
    }

    /// Consume the session and give the transport back.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// One command round trip: write the frame, wait the fixed settle delay
    /// the receiver firmware needs to stage its reply, then read back and
    /// classify whatever is on the bus.
    pub fn send(&mut self, frame: &UbxFrame) -> Result<Outcome> {
        trace!(
            "sending {:#04x}/{:#04x}, {} payload bytes",
            frame.class,
            frame.msg_id,
            frame.payload.len()
        );
        self.transport.write_frame(&frame.to_bytes())?;
        thread::sleep(COMMAND_SETTLE_DELAY);

        let mut header = [0u8; UBX_HEADER_LEN];
        let got = self.transport.read_bytes(&mut header)?;
        if got == UBX_HEADER_LEN && UbxFrame::header_is_idle(&header) {
            trace!("bus idle, no response staged");
            return Ok(Outcome::NoResponse);
        }
        if got < UBX_HEADER_LEN {
            return Err(Error::Frame(FrameError::Truncated {
                expect: UBX_HEADER_LEN,
                got,
            }));
        }

        let payload_len =
            u16::from_le_bytes([header[UBX_LENGTH_OFFSET], header[UBX_LENGTH_OFFSET + 1]]) as usize;
        let mut response = vec![0u8; UBX_HEADER_LEN + payload_len + UBX_CHECKSUM_LEN];
        response[..UBX_HEADER_LEN].copy_from_slice(&header);
        let rest = self.transport.read_bytes(&mut response[UBX_HEADER_LEN..])?;
        if rest < payload_len + UBX_CHECKSUM_LEN {
            return Err(Error::Frame(FrameError::Truncated {
                expect: response.len(),
                got: UBX_HEADER_LEN + rest,
            }));
        }

        let response = UbxFrame::decode(&response)?;
        Ok(Self::classify(response))
    }

    /// Sort a cleanly decoded frame into an acknowledge, a rejection, or a
    /// data answer. An unsolicited non-ACK frame is treated as the answer to
    /// the outstanding command; the typed decoders reject it later if it is
    /// not the one expected.
    fn classify(frame: UbxFrame) -> Outcome {
        if frame.class == ack::CLASS {
            match frame.msg_id {
                ack::NAK_ID => {
                    debug!("receiver nacked the command");
                    return Outcome::Nacked;
                },
                ack::ACK_ID => return Outcome::Acked(None),
                _ => {},
            }
        }
        Outcome::Acked(Some(frame))
    }

    /// Send `frame` and insist on a data response with the given class/id.
    fn request(&mut self, frame: UbxFrame, class: u8, msg_id: u8) -> Result<UbxFrame> {
        let sent = (frame.class, frame.msg_id);
        match self.send(&frame)? {
            Outcome::Acked(Some(resp)) if resp.is(class, msg_id) => Ok(resp),
            Outcome::Acked(Some(resp)) => Err(Error::UnexpectedPacket {
                class: resp.class,
                msg_id: resp.msg_id,
            }),
            Outcome::Acked(None) => Err(Error::UnexpectedPacket {
                class: ack::CLASS,
                msg_id: ack::ACK_ID,
            }),
            Outcome::Nacked => Err(Error::Nacked {
                class: sent.0,
                msg_id: sent.1,
            }),
            Outcome::NoResponse => Err(Error::TimedOut),
        }
    }

    /// Poll NAV-PVT until the receiver answers or `timeout` elapses.
    ///
    /// Only an idle bus is re-polled; a truncated or corrupted response, a
    /// rejection, or a wrong packet returns immediately so the caller keeps
    /// control over retry policy.
    pub fn poll_fix(&mut self, timeout: Duration) -> Result<PositionFix> {
        let deadline = Instant::now() + timeout;
        loop {
            let poll = UbxFrame::new(nav_pvt::CLASS, nav_pvt::MSG_ID, Vec::new());
            match self.send(&poll)? {
                Outcome::Acked(Some(resp)) if resp.is(nav_pvt::CLASS, nav_pvt::MSG_ID) => {
                    let pvt = nav_pvt::NavPvtRef::new(&resp.payload)?;
                    let fix = PositionFix::from(&pvt);
                    debug!("nav-pvt: {}", fix.raw_text);
                    return Ok(fix);
                },
                Outcome::Acked(Some(resp)) => {
                    return Err(Error::UnexpectedPacket {
                        class: resp.class,
                        msg_id: resp.msg_id,
                    });
                },
                Outcome::Acked(None) => {
                    return Err(Error::UnexpectedPacket {
                        class: ack::CLASS,
                        msg_id: ack::ACK_ID,
                    });
                },
                Outcome::Nacked => {
                    return Err(Error::Nacked {
                        class: nav_pvt::CLASS,
                        msg_id: nav_pvt::MSG_ID,
                    });
                },
                Outcome::NoResponse => {
                    if Instant::now() >= deadline {
                        return Err(Error::TimedOut);
                    }
                    thread::sleep(POLL_RECHECK_INTERVAL);
                },
            }
        }
    }

    /// Read MON-VER and keep the version strings, including the extension
    /// lines (firmware, protocol version, enabled constellations), for
    /// later queries.
    pub fn read_version(&mut self) -> Result<(String, String)> {
        let poll = UbxFrame::new(mon_ver::CLASS, mon_ver::MSG_ID, Vec::new());
        let resp = self.request(poll, mon_ver::CLASS, mon_ver::MSG_ID)?;
        let ver = mon_ver::MonVerRef::new(&resp.payload)?;
        let software = ver.software_version().to_owned();
        let hardware = ver.hardware_version().to_owned();
        debug!("receiver version: sw={software} hw={hardware}");
        self.version_extensions = ver.extensions().map(str::to_owned).collect();
        for ext in &self.version_extensions {
            debug!("  {ext}");
        }
        self.software_version = Some(software.clone());
        self.hardware_version = Some(hardware.clone());
        Ok((software, hardware))
    }

    /// Version strings from the last successful [`read_version`] call.
    ///
    /// [`read_version`]: UbxDevice::read_version
    pub fn version(&self) -> Option<(&str, &str)> {
        match (&self.software_version, &self.hardware_version) {
            (Some(sw), Some(hw)) => Some((sw.as_str(), hw.as_str())),
            _ => None,
        }
    }

    /// Extension strings from the last successful [`read_version`] call.
    ///
    /// [`read_version`]: UbxDevice::read_version
    pub fn version_extensions(&self) -> &[String] {
        &self.version_extensions
    }

    /// Read one configuration item from the RAM layer.
    pub fn get_config_item(&mut self, key: CfgKey) -> Result<CfgValue> {
        let poll = UbxFrame::new(
            cfg_val::CLASS,
            cfg_val::VALGET_ID,
            cfg_val::val_get_payload(key, CfgLayers::RAM),
        );
        let resp = self.request(poll, cfg_val::CLASS, cfg_val::VALGET_ID)?;
        let item = cfg_val::CfgValGetRef::new(&resp.payload)?;
        if item.key() != key {
            return Err(Error::UnexpectedPacket {
                class: cfg_val::CLASS,
                msg_id: cfg_val::VALGET_ID,
            });
        }
        item.value()
    }

    /// Write one configuration item to RAM and battery-backed RAM.
    pub fn set_config_item(&mut self, key: CfgKey, value: CfgValue) -> Result<()> {
        self.set_config_item_on(key, value, CfgLayers::RAM | CfgLayers::BBR)
    }

    /// Write one configuration item to an explicit set of layers.
    pub fn set_config_item_on(
        &mut self,
        key: CfgKey,
        value: CfgValue,
        layers: CfgLayers,
    ) -> Result<()> {
        let cmd = UbxFrame::new(
            cfg_val::CLASS,
            cfg_val::VALSET_ID,
            cfg_val::val_set_payload(key, value, layers),
        );
        match self.send(&cmd)? {
            Outcome::Acked(_) => Ok(()),
            Outcome::Nacked => Err(Error::Nacked {
                class: cfg_val::CLASS,
                msg_id: cfg_val::VALSET_ID,
            }),
            Outcome::NoResponse => Err(Error::TimedOut),
        }
    }

    /// Apply the power-up baseline: UBX only on the bus, errors-only
    /// information messages, all periodic NMEA output silenced, and the
    /// CFG-PM items back at their continuous-operation defaults.
    ///
    /// A rejected item is logged and skipped so one unsupported key does not
    /// abort the rest of the baseline; transport failures still propagate.
    pub fn set_initial_config(&mut self) -> Result<()> {
        self.apply_items(cfg_val::keys::INITIAL_CONFIG)
    }

    /// Switch the receiver between continuous tracking and duty-cycled
    /// power save with EXTINT wake.
    pub fn set_power_mode(&mut self, mode: PowerMode) -> Result<()> {
        let on = mode == PowerMode::OnOff;
        let items = [
            (cfg_val::keys::PM_EXTINTWAKE, CfgValue::Bool(on)),
            (cfg_val::keys::PM_EXTINTBACKUP, CfgValue::Bool(on)),
            (cfg_val::keys::PM_OPERATEMODE, CfgValue::U8(on as u8)),
        ];
        self.apply_items(&items)
    }

    fn apply_items(&mut self, items: &[(CfgKey, CfgValue)]) -> Result<()> {
        for &(key, value) in items {
            match self.set_config_item(key, value) {
                Ok(()) => {},
                Err(Error::Nacked { .. }) => {
                    warn!("receiver rejected configuration key {:#010x}", key.0);
                },
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
