use core::fmt;

use chrono::prelude::*;

use crate::error::DateTimeError;
use crate::packets::nav_pvt::{GnssFixType, NavPvtRef, NavPvtValid};

/// Calendar date of a fix, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UtcDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

/// Time of day of a fix, UTC. The date is optional: the ASCII receiver only
/// reports it once an RMC sentence has been seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UtcTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub date: Option<UtcDate>,
}

/// The most recent position solution, from either receiver generation.
///
/// A zeroed coordinate pair only ever means "never fixed"; consumers decide
/// trust from `valid`, `fix_type` or `position_available`, never from the
/// coordinates themselves.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionFix {
    pub utc_time: UtcTime,
    /// Signed decimal degrees, north positive.
    pub latitude: f64,
    /// Signed decimal degrees, east positive.
    pub longitude: f64,
    /// Meters above mean sea level. Only the ASCII receiver reports it.
    pub altitude: Option<f64>,
    pub num_satellites_used: u8,
    /// Fix class reported by the binary receiver.
    pub fix_type: GnssFixType,
    /// Position dilution of precision, binary receiver only.
    pub position_dop: f64,
    /// GGA fix quality indicator, ASCII receiver only.
    pub fix_indicator: u8,
    /// Horizontal dilution of precision, ASCII receiver only.
    pub horizontal_dop: f64,
    /// Per-field validity flags, binary receiver only.
    pub valid: NavPvtValid,
    /// Coarse "a position was decoded" flag for the ASCII receiver.
    pub position_available: bool,
    /// Human-readable echo of the last decoded message, for field logs.
    pub raw_text: String,
}

impl Default for PositionFix {
    fn default() -> Self {
        Self {
            utc_time: UtcTime::default(),
            latitude: 0.0,
            longitude: 0.0,
            altitude: None,
            num_satellites_used: 0,
            fix_type: GnssFixType::NoFix,
            position_dop: 0.0,
            fix_indicator: 0,
            horizontal_dop: 0.0,
            valid: NavPvtValid::empty(),
            position_available: false,
            raw_text: String::new(),
        }
    }
}

impl<'a> From<&NavPvtRef<'a>> for PositionFix {
    fn from(pvt: &NavPvtRef<'a>) -> Self {
        let valid = pvt.valid();
        let fix_type = pvt.fix_type();
        let raw_bits = valid.bits();
        let raw_text = format!(
            "{:02}/{:02}/{:04} {:02}:{:02}:{:02} [{} {} {} {}] {:?} {} [{} {}] {} {:.2}",
            pvt.day(),
            pvt.month(),
            pvt.year(),
            pvt.hour(),
            pvt.min(),
            pvt.sec(),
            raw_bits & 0x01,
            raw_bits & 0x02,
            raw_bits & 0x04,
            raw_bits & 0x08,
            fix_type,
            pvt.num_satellites(),
            pvt.lon_degrees(),
            pvt.lat_degrees(),
            pvt.flags3() & 0x01,
            pvt.position_dop(),
        );
        Self {
            utc_time: UtcTime {
                hour: pvt.hour(),
                minute: pvt.min(),
                second: pvt.sec(),
                date: Some(UtcDate {
                    year: pvt.year(),
                    month: pvt.month(),
                    day: pvt.day(),
                }),
            },
            latitude: pvt.lat_degrees(),
            longitude: pvt.lon_degrees(),
            altitude: None,
            num_satellites_used: pvt.num_satellites(),
            fix_type,
            position_dop: pvt.position_dop(),
            fix_indicator: 0,
            horizontal_dop: 0.0,
            valid,
            position_available: fix_type.has_position(),
            raw_text,
        }
    }
}

impl TryFrom<&PositionFix> for DateTime<Utc> {
    type Error = DateTimeError;

    fn try_from(fix: &PositionFix) -> Result<Self, Self::Error> {
        let date = fix.utc_time.date.ok_or(DateTimeError::MissingDate)?;
        let date = NaiveDate::from_ymd_opt(
            i32::from(date.year),
            u32::from(date.month),
            u32::from(date.day),
        )
        .ok_or(DateTimeError::InvalidDate)?;
        let time = NaiveTime::from_hms_opt(
            u32::from(fix.utc_time.hour),
            u32::from(fix.utc_time.minute),
            u32::from(fix.utc_time.second),
        )
        .ok_or(DateTimeError::InvalidTime)?;
        Ok(NaiveDateTime::new(date, time).and_utc())
    }
}

/// Qualitative label for a dilution-of-precision value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DopQuality {
    Ideal,
    Excellent,
    Good,
    Moderate,
    Fair,
    Poor,
}

impl DopQuality {
    pub fn from_dop(dop: f64) -> Self {
        if dop < 1.0 {
            DopQuality::Ideal
        } else if dop < 2.0 {
            DopQuality::Excellent
        } else if dop < 5.0 {
            DopQuality::Good
        } else if dop < 10.0 {
            DopQuality::Moderate
        } else if dop < 20.0 {
            DopQuality::Fair
        } else {
            DopQuality::Poor
        }
    }
}

impl fmt::Display for DopQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DopQuality::Ideal => "ideal",
            DopQuality::Excellent => "excellent",
            DopQuality::Good => "good",
            DopQuality::Moderate => "moderate",
            DopQuality::Fair => "fair",
            DopQuality::Poor => "poor",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dop_thresholds_are_half_open() {
        assert_eq!(DopQuality::from_dop(0.0), DopQuality::Ideal);
        assert_eq!(DopQuality::from_dop(0.99), DopQuality::Ideal);
        assert_eq!(DopQuality::from_dop(1.0), DopQuality::Excellent);
        assert_eq!(DopQuality::from_dop(1.99), DopQuality::Excellent);
        assert_eq!(DopQuality::from_dop(2.0), DopQuality::Good);
        assert_eq!(DopQuality::from_dop(5.0), DopQuality::Moderate);
        assert_eq!(DopQuality::from_dop(10.0), DopQuality::Fair);
        assert_eq!(DopQuality::from_dop(19.99), DopQuality::Fair);
        assert_eq!(DopQuality::from_dop(20.0), DopQuality::Poor);
    }

    #[test]
    fn datetime_conversion_requires_a_date() {
        let mut fix = PositionFix::default();
        assert_eq!(
            DateTime::<Utc>::try_from(&fix),
            Err(DateTimeError::MissingDate)
        );

        fix.utc_time = UtcTime {
            hour: 12,
            minute: 41,
            second: 27,
            date: Some(UtcDate {
                year: 2025,
                month: 9,
                day: 2,
            }),
        };
        let dt = DateTime::<Utc>::try_from(&fix).unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-09-02T12:41:27+00:00");
    }

    #[test]
    fn out_of_range_fields_are_typed_errors() {
        let mut fix = PositionFix::default();
        fix.utc_time = UtcTime {
            hour: 12,
            minute: 0,
            second: 0,
            date: Some(UtcDate {
                year: 2025,
                month: 13,
                day: 1,
            }),
        };
        assert_eq!(
            DateTime::<Utc>::try_from(&fix),
            Err(DateTimeError::InvalidDate)
        );

        fix.utc_time.date = Some(UtcDate {
            year: 2025,
            month: 9,
            day: 2,
        });
        fix.utc_time.hour = 24;
        assert_eq!(
            DateTime::<Utc>::try_from(&fix),
            Err(DateTimeError::InvalidTime)
        );
    }

    #[test]
    fn never_fixed_default_is_all_zeroes() {
        let fix = PositionFix::default();
        assert_eq!(fix.latitude, 0.0);
        assert_eq!(fix.longitude, 0.0);
        assert!(!fix.position_available);
        assert!(fix.valid.is_empty());
    }
}
