use bitflags::bitflags;

use crate::error::Error;

pub const CLASS: u8 = 0x01;
pub const MSG_ID: u8 = 0x07;

/// Byte offsets into the NAV-PVT payload. All multi-byte fields are
/// little-endian; longitude and latitude are signed.
mod field {
    /// GPS time of week, ms (u32). Diagnostic only.
    pub const ITOW: usize = 0;
    /// Year, UTC (u16).
    pub const YEAR: usize = 4;
    pub const MONTH: usize = 6;
    pub const DAY: usize = 7;
    pub const HOUR: usize = 8;
    pub const MIN: usize = 9;
    pub const SEC: usize = 10;
    /// Validity flags, low nibble.
    pub const VALID: usize = 11;
    pub const FIX_TYPE: usize = 20;
    pub const NUM_SATELLITES: usize = 23;
    /// 1e-7 degrees (i32).
    pub const LON: usize = 24;
    /// 1e-7 degrees (i32).
    pub const LAT: usize = 28;
    /// Position DOP, 0.01 units (u16).
    pub const PDOP: usize = 76;
    pub const FLAGS3: usize = 78;

    /// Last byte the decoder touches. Current firmware sends 92 bytes;
    /// anything past FLAGS3 is ignored.
    pub const MIN_LEN: usize = FLAGS3 + 2;
}

bitflags! {
    /// Validity flags carried in the low nibble of the `valid` byte.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct NavPvtValid: u8 {
        const VALID_DATE = 0x01;
        const VALID_TIME = 0x02;
        const FULLY_RESOLVED = 0x04;
        const VALID_MAG = 0x08;
    }
}

/// GNSS fix type reported in NAV-PVT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GnssFixType {
    NoFix,
    DeadReckoningOnly,
    Fix2D,
    Fix3D,
    GnssAndDeadReckoning,
    TimeOnly,
    Unknown(u8),
}

impl From<u8> for GnssFixType {
    fn from(raw: u8) -> Self {
        match raw {
            0 => GnssFixType::NoFix,
            1 => GnssFixType::DeadReckoningOnly,
            2 => GnssFixType::Fix2D,
            3 => GnssFixType::Fix3D,
            4 => GnssFixType::GnssAndDeadReckoning,
            5 => GnssFixType::TimeOnly,
            other => GnssFixType::Unknown(other),
        }
    }
}

impl GnssFixType {
    /// True for fix types that carry a usable position.
    pub fn has_position(self) -> bool {
        matches!(
            self,
            GnssFixType::Fix2D | GnssFixType::Fix3D | GnssFixType::GnssAndDeadReckoning
        )
    }
}

/// Zero-copy view over a NAV-PVT payload.
#[derive(Debug)]
pub struct NavPvtRef<'a>(&'a [u8]);

impl<'a> NavPvtRef<'a> {
    pub fn new(payload: &'a [u8]) -> Result<Self, Error> {
        if payload.len() < field::MIN_LEN {
            return Err(Error::InvalidPayloadLen {
                packet: "NAV-PVT",
                expect: field::MIN_LEN,
                got: payload.len(),
            });
        }
        Ok(Self(payload))
    }

    fn u16_at(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.0[offset], self.0[offset + 1]])
    }

    fn u32_at(&self, offset: usize) -> u32 {
        u32::from_le_bytes([
            self.0[offset],
            self.0[offset + 1],
            self.0[offset + 2],
            self.0[offset + 3],
        ])
    }

    fn i32_at(&self, offset: usize) -> i32 {
        self.u32_at(offset) as i32
    }

    pub fn itow(&self) -> u32 {
        self.u32_at(field::ITOW)
    }

    pub fn year(&self) -> u16 {
        self.u16_at(field::YEAR)
    }

    pub fn month(&self) -> u8 {
        self.0[field::MONTH]
    }

    pub fn day(&self) -> u8 {
        self.0[field::DAY]
    }

    pub fn hour(&self) -> u8 {
        self.0[field::HOUR]
    }

    pub fn min(&self) -> u8 {
        self.0[field::MIN]
    }

    pub fn sec(&self) -> u8 {
        self.0[field::SEC]
    }

    pub fn valid(&self) -> NavPvtValid {
        NavPvtValid::from_bits_truncate(self.0[field::VALID])
    }

    pub fn fix_type(&self) -> GnssFixType {
        GnssFixType::from(self.0[field::FIX_TYPE])
    }

    pub fn num_satellites(&self) -> u8 {
        self.0[field::NUM_SATELLITES]
    }

    /// Longitude in degrees.
    pub fn lon_degrees(&self) -> f64 {
        f64::from(self.i32_at(field::LON)) * 1e-7
    }

    /// Latitude in degrees.
    pub fn lat_degrees(&self) -> f64 {
        f64::from(self.i32_at(field::LAT)) * 1e-7
    }

    /// Position dilution of precision, unitless.
    pub fn position_dop(&self) -> f64 {
        f64::from(self.u16_at(field::PDOP)) * 1e-2
    }

    pub fn flags3(&self) -> u16 {
        self.u16_at(field::FLAGS3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> Vec<u8> {
        let mut p = vec![0u8; 92];
        p[field::ITOW..field::ITOW + 4].copy_from_slice(&123_000_u32.to_le_bytes());
        p[field::YEAR..field::YEAR + 2].copy_from_slice(&2025_u16.to_le_bytes());
        p[field::MONTH] = 9;
        p[field::DAY] = 2;
        p[field::HOUR] = 12;
        p[field::MIN] = 41;
        p[field::SEC] = 27;
        p[field::VALID] = 0b0000_0111;
        p[field::FIX_TYPE] = 3;
        p[field::NUM_SATELLITES] = 9;
        p[field::LON..field::LON + 4].copy_from_slice(&123_456_789_i32.to_le_bytes());
        p[field::LAT..field::LAT + 4].copy_from_slice(&(-123_456_789_i32).to_le_bytes());
        p[field::PDOP..field::PDOP + 2].copy_from_slice(&97_u16.to_le_bytes());
        p
    }

    #[test]
    fn decodes_fixed_offset_fields() {
        let payload = payload();
        let pvt = NavPvtRef::new(&payload).unwrap();
        assert_eq!(pvt.year(), 2025);
        assert_eq!((pvt.month(), pvt.day()), (9, 2));
        assert_eq!((pvt.hour(), pvt.min(), pvt.sec()), (12, 41, 27));
        assert_eq!(pvt.num_satellites(), 9);
        assert_eq!(pvt.fix_type(), GnssFixType::Fix3D);
        assert!((pvt.position_dop() - 0.97).abs() < 1e-9);
    }

    #[test]
    fn coordinates_scale_and_keep_sign() {
        let payload = payload();
        let pvt = NavPvtRef::new(&payload).unwrap();
        assert!((pvt.lon_degrees() - 12.345_678_9).abs() < 1e-12);
        assert!((pvt.lat_degrees() + 12.345_678_9).abs() < 1e-12);
    }

    #[test]
    fn validity_nibble_maps_to_flags() {
        let mut payload = payload();
        payload[field::VALID] = 0b0000_1111;
        let pvt = NavPvtRef::new(&payload).unwrap();
        assert_eq!(pvt.valid(), NavPvtValid::all());

        payload[field::VALID] = 0;
        let pvt = NavPvtRef::new(&payload).unwrap();
        assert!(pvt.valid().is_empty());
    }

    #[test]
    fn trailing_bytes_are_ignored_but_short_payload_is_not() {
        let mut payload = payload();
        payload.extend_from_slice(&[0xaa; 12]);
        assert!(NavPvtRef::new(&payload).is_ok());

        let err = NavPvtRef::new(&payload[..field::MIN_LEN - 1]).unwrap_err();
        assert!(matches!(err, Error::InvalidPayloadLen { .. }));
    }
}
