//! ASCII receiver generation: NMEA sentences over a USB serial port.
//!
//! The receiver free-runs; there is no command channel. The session finds
//! the port by its USB product description, opens it at 115200-8N1 and
//! listens for a caller-bounded window, decoding GGA and RMC sentences into
//! the shared fix model. Malformed sentences are discarded, never fatal.

use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace};
use serialport::{SerialPort, SerialPortType};

use crate::error::{Error, Result};
use crate::fix::{PositionFix, UtcDate};

const BAUD_RATE: u32 = 115_200;
const PORT_DESCRIPTION_PREFIX: &str = "u-blox 7 - GPS/GNSS Receiver";
/// Yield interval while the port has nothing buffered.
const IDLE_POLL: Duration = Duration::from_millis(10);
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Accumulates raw serial bytes and releases only complete CR/LF-terminated
/// sentences. A sentence split across reads stays buffered until its
/// terminator arrives.
#[derive(Default)]
pub(crate) struct SentenceBuffer {
    pending: String,
}

impl SentenceBuffer {
    pub(crate) fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.push_str(&String::from_utf8_lossy(bytes));
        let mut lines = Vec::new();
        while let Some(at) = self.pending.find('\n') {
            let line = self.pending[..at].trim_end_matches('\r').to_owned();
            self.pending.drain(..=at);
            if !line.is_empty() {
                lines.push(line);
            }
        }
        lines
    }
}

/// Decode one sentence into the fix. Returns whether a recognized sentence
/// parsed cleanly; anything else leaves the fix untouched.
fn apply_sentence(fix: &mut PositionFix, line: &str) -> bool {
    if !line.starts_with('$') {
        return false;
    }
    // The `*hh` checksum suffix is tolerated and ignored.
    let body = line.split('*').next().unwrap_or(line);
    let fields: Vec<&str> = body.split(',').collect();
    let kind = fields[0].get(3..).unwrap_or("");
    let applied = match kind {
        "GGA" => apply_gga(fix, &fields),
        "RMC" => apply_rmc(fix, &fields),
        _ => {
            trace!("ignoring sentence type {kind:?}");
            return false;
        },
    };
    match applied {
        Some(()) => {
            fix.raw_text = line.to_owned();
            true
        },
        None => {
            debug!("discarding malformed sentence: {line}");
            false
        },
    }
}

/// Fix-data sentence: time, coordinates, quality, satellites, HDOP,
/// altitude. Empty time/coordinate fields preserve the prior value; empty
/// quality, satellite-count, HDOP and altitude fields reset, matching the
/// receiver's observed behavior.
fn apply_gga(fix: &mut PositionFix, fields: &[&str]) -> Option<()> {
    if fields.len() < 10 {
        return None;
    }
    let time = match fields[1] {
        "" => None,
        s => Some(parse_hms(s)?),
    };
    let latitude = match fields[2] {
        "" => None,
        s => Some(signed(ddmm_to_degrees(s)?, fields[3] == "S")),
    };
    let longitude = match fields[4] {
        "" => None,
        s => Some(signed(ddmm_to_degrees(s)?, fields[5] == "W")),
    };
    let quality: u8 = parse_or_default(fields[6])?;
    let satellites: u8 = parse_or_default(fields[7])?;
    let hdop: f64 = parse_or_default(fields[8])?;
    let altitude = match fields[9] {
        "" => None,
        s => Some(s.parse::<f64>().ok()?),
    };

    if let Some((hour, minute, second)) = time {
        fix.utc_time.hour = hour;
        fix.utc_time.minute = minute;
        fix.utc_time.second = second;
    }
    if let Some(lat) = latitude {
        fix.latitude = lat;
    }
    if let Some(lon) = longitude {
        fix.longitude = lon;
    }
    fix.fix_indicator = quality;
    fix.num_satellites_used = satellites;
    fix.horizontal_dop = hdop;
    fix.altitude = altitude;
    fix.position_available = quality > 0;
    Some(())
}

/// Recurring minimum-data sentence: only the `ddmmyy` date field is used,
/// and only when present.
fn apply_rmc(fix: &mut PositionFix, fields: &[&str]) -> Option<()> {
    if fields.len() < 10 {
        return None;
    }
    let date = fields[9];
    if date.len() == 6 {
        let day: u8 = date.get(0..2)?.parse().ok()?;
        let month: u8 = date.get(2..4)?.parse().ok()?;
        let year: u16 = date.get(4..6)?.parse().ok()?;
        fix.utc_time.date = Some(UtcDate {
            year: 2000 + year,
            month,
            day,
        });
    }
    Some(())
}

fn parse_hms(s: &str) -> Option<(u8, u8, u8)> {
    let hour = s.get(0..2)?.parse().ok()?;
    let minute = s.get(2..4)?.parse().ok()?;
    let second = s.get(4..6)?.parse().ok()?;
    Some((hour, minute, second))
}

/// `ddmm.mmmm` (or `dddmm.mmmm`) to decimal degrees.
fn ddmm_to_degrees(s: &str) -> Option<f64> {
    let raw: f64 = s.parse().ok()?;
    let degrees = (raw / 100.0).floor();
    Some(degrees + (raw - degrees * 100.0) / 60.0)
}

fn signed(degrees: f64, negative: bool) -> f64 {
    if negative {
        -degrees
    } else {
        degrees
    }
}

/// An empty field decodes as the type's zero; a non-empty field must parse.
fn parse_or_default<T: FromStr + Default>(s: &str) -> Option<T> {
    if s.is_empty() {
        Some(T::default())
    } else {
        s.parse().ok()
    }
}

/// A session with the ASCII-protocol receiver generation.
pub struct NmeaDevice {
    port_name: Option<String>,
    serial: Option<Box<dyn SerialPort>>,
    buffer: SentenceBuffer,
    fix: PositionFix,
    ready: bool,
}

impl NmeaDevice {
    /// Look the receiver up among the system's serial ports by its USB
    /// product description.
    pub fn discover() -> Option<String> {
        let mut ports = serialport::available_ports().unwrap_or_default();
        ports.sort_by(|a, b| a.port_name.cmp(&b.port_name));
        ports.into_iter().find_map(|p| match p.port_type {
            SerialPortType::UsbPort(usb)
                if usb
                    .product
                    .as_deref()
                    .is_some_and(|d| d.starts_with(PORT_DESCRIPTION_PREFIX)) =>
            {
                Some(p.port_name)
            },
            _ => None,
        })
    }

    pub fn new() -> Self {
        let port_name = Self::discover();
        match &port_name {
            Some(name) => debug!("found NMEA receiver on {name}"),
            None => debug!("no NMEA receiver present"),
        }
        Self {
            port_name,
            serial: None,
            buffer: SentenceBuffer::default(),
            fix: PositionFix::default(),
            ready: false,
        }
    }

    /// Whether discovery found a matching port.
    pub fn is_available(&self) -> bool {
        self.port_name.is_some()
    }

    pub fn open(&mut self) -> Result<()> {
        let name = self.port_name.as_deref().ok_or(Error::PortNotFound)?;
        if self.serial.is_none() {
            let port = serialport::new(name, BAUD_RATE)
                .timeout(READ_TIMEOUT)
                .open()?;
            self.serial = Some(port);
        }
        Ok(())
    }

    pub fn close(&mut self) {
        self.serial = None;
    }

    /// Listen for `window`, decoding whatever sentences arrive.
    ///
    /// Always returns the fix, updated or not; [`is_ready`] says whether
    /// this window produced at least one clean sentence. Parse failures are
    /// absorbed, port failures are not.
    ///
    /// [`is_ready`]: NmeaDevice::is_ready
    pub fn listen(&mut self, window: Duration) -> Result<PositionFix> {
        let port = self.serial.as_mut().ok_or(Error::NotOpen)?;
        self.ready = false;
        let deadline = Instant::now() + window;
        let mut chunk = [0u8; 512];
        while Instant::now() < deadline {
            let waiting = port.bytes_to_read()? as usize;
            if waiting == 0 {
                thread::sleep(IDLE_POLL);
                continue;
            }
            let take = waiting.min(chunk.len());
            let got = port.read(&mut chunk[..take])?;
            for line in self.buffer.feed(&chunk[..got]) {
                if apply_sentence(&mut self.fix, &line) {
                    self.ready = true;
                }
            }
        }
        Ok(self.fix.clone())
    }

    /// Whether the last listen window decoded at least one clean sentence.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// The most recent fix, across listen windows.
    pub fn fix(&self) -> &PositionFix {
        &self.fix
    }
}

impl Default for NmeaDevice {
    fn default() -> Self {
        Self::new()
    }
}
