//! # gnss-fix
//!
//! Position-fix acquisition for the two GNSS receiver generations carried by
//! our field-deployed monitoring units: a binary UBX-protocol module behind
//! an addressed two-wire bus, and an older ASCII NMEA receiver on USB
//! serial. Both feed the same [`PositionFix`] model so the rest of the
//! system does not care which generation is installed.
//!
//! Binary receiver
//! ===============
//!
//! [`UbxDevice`] wraps any blocking byte transport and speaks the UBX
//! command/response protocol: one frame out, a fixed settle delay, one
//! answer back. The high-level calls cover what the deployment needs:
//! configuration, power mode, version identification and position polling.
//!
//! ```no_run
//! use std::time::Duration;
//! use gnss_fix::{PowerMode, UbxDevice};
//!
//! # fn main() -> gnss_fix::Result<()> {
//! let bus = std::fs::OpenOptions::new()
//!     .read(true)
//!     .write(true)
//!     .open("/dev/i2c-gnss")?;
//! let mut device = UbxDevice::new(bus);
//! device.set_initial_config()?;
//! device.set_power_mode(PowerMode::Normal)?;
//! let fix = device.poll_fix(Duration::from_secs(30))?;
//! println!("{} sats, pdop {:.2}", fix.num_satellites_used, fix.position_dop);
//! # Ok(())
//! # }
//! ```
//!
//! ASCII receiver
//! ==============
//!
//! [`NmeaDevice`] finds the receiver by its USB product description and
//! decodes whatever sentences arrive during a caller-bounded listen window:
//!
//! ```no_run
//! use std::time::Duration;
//! use gnss_fix::NmeaDevice;
//!
//! # fn main() -> gnss_fix::Result<()> {
//! let mut gnss = NmeaDevice::new();
//! if gnss.is_available() {
//!     gnss.open()?;
//!     let fix = gnss.listen(Duration::from_secs(2))?;
//!     println!("{:.6} {:.6}", fix.latitude, fix.longitude);
//! }
//! # Ok(())
//! # }
//! ```

mod checksum;
mod constants;
mod device;
pub mod error;
mod fix;
mod frame;
mod nmea;
pub mod packets;
mod transport;

pub use crate::{
    constants::{UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2},
    device::{Outcome, PowerMode, UbxDevice},
    error::{DateTimeError, Error, FrameError, Result},
    fix::{DopQuality, PositionFix, UtcDate, UtcTime},
    frame::UbxFrame,
    nmea::NmeaDevice,
    packets::cfg_val::{CfgKey, CfgLayers, CfgValue},
    packets::nav_pvt::{GnssFixType, NavPvtValid},
    transport::UbxTransport,
};
