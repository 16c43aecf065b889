use bitflags::bitflags;

use crate::error::Error;

pub const CLASS: u8 = 0x06;
pub const VALGET_ID: u8 = 0x8b;
pub const VALSET_ID: u8 = 0x8a;

/// Request header: version, layer byte, then two reserved/position bytes.
const HEADER_LEN: usize = 4;
const KEY_LEN: usize = 4;

bitflags! {
    /// Persistence layers a configuration write targets.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CfgLayers: u8 {
        /// Volatile, lost on power-down.
        const RAM = 0x01;
        /// Battery-backed RAM.
        const BBR = 0x02;
        /// On-module flash, where fitted.
        const FLASH = 0x04;
    }
}

bitflags! {
    /// Information message classes routed by the CFG-INFMSG keys.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InfMsgMask: u8 {
        const ERROR = 0x01;
        const WARNING = 0x02;
        const NOTICE = 0x04;
        const TEST = 0x08;
        const DEBUG = 0x10;
    }
}

/// Width of a configuration value, encoded in bits 28..31 of its key id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageSize {
    OneBit,
    OneByte,
    TwoBytes,
    FourBytes,
    EightBytes,
}

impl StorageSize {
    /// Bytes the value occupies on the wire. Single-bit items are carried
    /// as one byte.
    pub const fn to_usize(self) -> usize {
        match self {
            Self::OneBit | Self::OneByte => 1,
            Self::TwoBytes => 2,
            Self::FourBytes => 4,
            Self::EightBytes => 8,
        }
    }
}

/// A 32-bit configuration key id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CfgKey(pub u32);

impl CfgKey {
    pub const fn value_size(self) -> StorageSize {
        match (self.0 >> 28) & 0b111 {
            1 => StorageSize::OneBit,
            2 => StorageSize::OneByte,
            3 => StorageSize::TwoBytes,
            4 => StorageSize::FourBytes,
            // 5 and everything undefined; undefined ids do not occur in the
            // key catalogue below.
            _ => StorageSize::EightBytes,
        }
    }

    pub const fn group_id(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn item_id(self) -> u8 {
        self.0 as u8
    }
}

/// A configuration value of the width its key declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfgValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
}

impl CfgValue {
    pub const fn size(self) -> usize {
        match self {
            CfgValue::Bool(_) | CfgValue::U8(_) => 1,
            CfgValue::U16(_) => 2,
            CfgValue::U32(_) => 4,
            CfgValue::U64(_) => 8,
        }
    }

    fn write_le(self, out: &mut Vec<u8>) {
        match self {
            CfgValue::Bool(v) => out.push(v as u8),
            CfgValue::U8(v) => out.push(v),
            CfgValue::U16(v) => out.extend_from_slice(&v.to_le_bytes()),
            CfgValue::U32(v) => out.extend_from_slice(&v.to_le_bytes()),
            CfgValue::U64(v) => out.extend_from_slice(&v.to_le_bytes()),
        }
    }

    fn read_le(size: StorageSize, bytes: &[u8]) -> Self {
        match size {
            StorageSize::OneBit => CfgValue::Bool(bytes[0] != 0),
            StorageSize::OneByte => CfgValue::U8(bytes[0]),
            StorageSize::TwoBytes => CfgValue::U16(u16::from_le_bytes([bytes[0], bytes[1]])),
            StorageSize::FourBytes => {
                CfgValue::U32(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            },
            StorageSize::EightBytes => CfgValue::U64(u64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ])),
        }
    }
}

/// CFG-VALGET request payload for one key.
pub fn val_get_payload(key: CfgKey, layer: CfgLayers) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + KEY_LEN);
    out.push(0x00); // version
    out.push(layer.bits());
    out.extend_from_slice(&0u16.to_le_bytes()); // position
    out.extend_from_slice(&key.0.to_le_bytes());
    out
}

/// CFG-VALSET request payload for one key/value pair.
pub fn val_set_payload(key: CfgKey, value: CfgValue, layers: CfgLayers) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + KEY_LEN + value.size());
    out.push(0x00); // version
    out.push(layers.bits());
    out.extend_from_slice(&0u16.to_le_bytes()); // reserved
    out.extend_from_slice(&key.0.to_le_bytes());
    value.write_le(&mut out);
    out
}

/// Zero-copy view over a CFG-VALGET response payload: the echoed request
/// header followed by the key and its value bytes.
#[derive(Debug)]
pub struct CfgValGetRef<'a>(&'a [u8]);

impl<'a> CfgValGetRef<'a> {
    pub fn new(payload: &'a [u8]) -> Result<Self, Error> {
        let min = HEADER_LEN + KEY_LEN;
        if payload.len() < min {
            return Err(Error::InvalidPayloadLen {
                packet: "CFG-VALGET",
                expect: min,
                got: payload.len(),
            });
        }
        Ok(Self(payload))
    }

    pub fn key(&self) -> CfgKey {
        CfgKey(u32::from_le_bytes([
            self.0[HEADER_LEN],
            self.0[HEADER_LEN + 1],
            self.0[HEADER_LEN + 2],
            self.0[HEADER_LEN + 3],
        ]))
    }

    /// The value, at the width the echoed key declares.
    pub fn value(&self) -> Result<CfgValue, Error> {
        let size = self.key().value_size();
        let value_at = HEADER_LEN + KEY_LEN;
        let expect = value_at + size.to_usize();
        if self.0.len() < expect {
            return Err(Error::InvalidPayloadLen {
                packet: "CFG-VALGET",
                expect,
                got: self.0.len(),
            });
        }
        Ok(CfgValue::read_le(size, &self.0[value_at..]))
    }
}

/// Well-known configuration keys, limited to the ones this subsystem
/// actually drives.
pub mod keys {
    use super::{CfgKey, CfgValue, InfMsgMask};

    // Bus protocol routing.
    pub const I2CINPROT_UBX: CfgKey = CfgKey(0x1071_0001);
    pub const I2CINPROT_NMEA: CfgKey = CfgKey(0x1071_0002);
    pub const I2COUTPROT_UBX: CfgKey = CfgKey(0x1072_0001);
    pub const I2COUTPROT_NMEA: CfgKey = CfgKey(0x1072_0002);

    // Information message routing per interface.
    pub const INFMSG_UBX_I2C: CfgKey = CfgKey(0x2092_0001);
    pub const INFMSG_UBX_UART1: CfgKey = CfgKey(0x2092_0002);
    pub const INFMSG_UBX_SPI: CfgKey = CfgKey(0x2092_0005);
    pub const INFMSG_NMEA_I2C: CfgKey = CfgKey(0x2092_0006);
    pub const INFMSG_NMEA_UART1: CfgKey = CfgKey(0x2092_0007);
    pub const INFMSG_NMEA_SPI: CfgKey = CfgKey(0x2092_000a);

    // Per-sentence NMEA output rates, I2C and UART1.
    pub const MSGOUT_NMEA_DTM_I2C: CfgKey = CfgKey(0x2091_00a6);
    pub const MSGOUT_NMEA_DTM_UART1: CfgKey = CfgKey(0x2091_00a7);
    pub const MSGOUT_NMEA_GBS_I2C: CfgKey = CfgKey(0x2091_00dd);
    pub const MSGOUT_NMEA_GBS_UART1: CfgKey = CfgKey(0x2091_00de);
    pub const MSGOUT_NMEA_GGA_I2C: CfgKey = CfgKey(0x2091_00ba);
    pub const MSGOUT_NMEA_GGA_UART1: CfgKey = CfgKey(0x2091_00bb);
    pub const MSGOUT_NMEA_GLL_I2C: CfgKey = CfgKey(0x2091_00c9);
    pub const MSGOUT_NMEA_GLL_UART1: CfgKey = CfgKey(0x2091_00ca);
    pub const MSGOUT_NMEA_GNS_I2C: CfgKey = CfgKey(0x2091_00b5);
    pub const MSGOUT_NMEA_GNS_UART1: CfgKey = CfgKey(0x2091_00b6);
    pub const MSGOUT_NMEA_GRS_I2C: CfgKey = CfgKey(0x2091_00ce);
    pub const MSGOUT_NMEA_GRS_UART1: CfgKey = CfgKey(0x2091_00cf);
    pub const MSGOUT_NMEA_GSA_I2C: CfgKey = CfgKey(0x2091_00bf);
    pub const MSGOUT_NMEA_GSA_UART1: CfgKey = CfgKey(0x2091_00c0);
    pub const MSGOUT_NMEA_GST_I2C: CfgKey = CfgKey(0x2091_00d3);
    pub const MSGOUT_NMEA_GST_UART1: CfgKey = CfgKey(0x2091_00d4);
    pub const MSGOUT_NMEA_GSV_I2C: CfgKey = CfgKey(0x2091_00c4);
    pub const MSGOUT_NMEA_GSV_UART1: CfgKey = CfgKey(0x2091_00c5);
    pub const MSGOUT_NMEA_RLM_I2C: CfgKey = CfgKey(0x2091_0400);
    pub const MSGOUT_NMEA_RLM_UART1: CfgKey = CfgKey(0x2091_0401);
    pub const MSGOUT_NMEA_RMC_I2C: CfgKey = CfgKey(0x2091_00ab);
    pub const MSGOUT_NMEA_RMC_UART1: CfgKey = CfgKey(0x2091_00ac);
    pub const MSGOUT_NMEA_VLW_I2C: CfgKey = CfgKey(0x2091_00e7);
    pub const MSGOUT_NMEA_VLW_UART1: CfgKey = CfgKey(0x2091_00e8);
    pub const MSGOUT_NMEA_VTG_I2C: CfgKey = CfgKey(0x2091_00b0);
    pub const MSGOUT_NMEA_VTG_UART1: CfgKey = CfgKey(0x2091_00b1);
    pub const MSGOUT_NMEA_ZDA_I2C: CfgKey = CfgKey(0x2091_00d8);
    pub const MSGOUT_NMEA_ZDA_UART1: CfgKey = CfgKey(0x2091_00d9);

    // Power management.
    pub const PM_OPERATEMODE: CfgKey = CfgKey(0x20d0_0001);
    pub const PM_EXTINTWAKE: CfgKey = CfgKey(0x10d0_000c);
    pub const PM_EXTINTBACKUP: CfgKey = CfgKey(0x10d0_000d);

    /// Baseline applied after power-up: UBX only on the bus, errors-only
    /// information messages, every NMEA talker silenced, continuous power
    /// operation.
    pub const INITIAL_CONFIG: &[(CfgKey, CfgValue)] = &[
        (I2CINPROT_UBX, CfgValue::Bool(true)),
        (I2CINPROT_NMEA, CfgValue::Bool(false)),
        (I2COUTPROT_UBX, CfgValue::Bool(true)),
        (I2COUTPROT_NMEA, CfgValue::Bool(false)),
        (INFMSG_UBX_I2C, CfgValue::U8(InfMsgMask::ERROR.bits())),
        (INFMSG_UBX_UART1, CfgValue::U8(InfMsgMask::ERROR.bits())),
        (INFMSG_UBX_SPI, CfgValue::U8(InfMsgMask::ERROR.bits())),
        (INFMSG_NMEA_I2C, CfgValue::U8(InfMsgMask::ERROR.bits())),
        (INFMSG_NMEA_UART1, CfgValue::U8(InfMsgMask::ERROR.bits())),
        (INFMSG_NMEA_SPI, CfgValue::U8(InfMsgMask::ERROR.bits())),
        (MSGOUT_NMEA_DTM_I2C, CfgValue::U8(0)),
        (MSGOUT_NMEA_DTM_UART1, CfgValue::U8(0)),
        (MSGOUT_NMEA_GBS_I2C, CfgValue::U8(0)),
        (MSGOUT_NMEA_GBS_UART1, CfgValue::U8(0)),
        (MSGOUT_NMEA_GGA_I2C, CfgValue::U8(0)),
        (MSGOUT_NMEA_GGA_UART1, CfgValue::U8(0)),
        (MSGOUT_NMEA_GLL_I2C, CfgValue::U8(0)),
        (MSGOUT_NMEA_GLL_UART1, CfgValue::U8(0)),
        (MSGOUT_NMEA_GNS_I2C, CfgValue::U8(0)),
        (MSGOUT_NMEA_GNS_UART1, CfgValue::U8(0)),
        (MSGOUT_NMEA_GRS_I2C, CfgValue::U8(0)),
        (MSGOUT_NMEA_GRS_UART1, CfgValue::U8(0)),
        (MSGOUT_NMEA_GSA_I2C, CfgValue::U8(0)),
        (MSGOUT_NMEA_GSA_UART1, CfgValue::U8(0)),
        (MSGOUT_NMEA_GST_I2C, CfgValue::U8(0)),
        (MSGOUT_NMEA_GST_UART1, CfgValue::U8(0)),
        (MSGOUT_NMEA_GSV_I2C, CfgValue::U8(0)),
        (MSGOUT_NMEA_GSV_UART1, CfgValue::U8(0)),
        (MSGOUT_NMEA_RLM_I2C, CfgValue::U8(0)),
        (MSGOUT_NMEA_RLM_UART1, CfgValue::U8(0)),
        (MSGOUT_NMEA_RMC_I2C, CfgValue::U8(0)),
        (MSGOUT_NMEA_RMC_UART1, CfgValue::U8(0)),
        (MSGOUT_NMEA_VLW_I2C, CfgValue::U8(0)),
        (MSGOUT_NMEA_VLW_UART1, CfgValue::U8(0)),
        (MSGOUT_NMEA_VTG_I2C, CfgValue::U8(0)),
        (MSGOUT_NMEA_VTG_UART1, CfgValue::U8(0)),
        (MSGOUT_NMEA_ZDA_I2C, CfgValue::U8(0)),
        (MSGOUT_NMEA_ZDA_UART1, CfgValue::U8(0)),
        (PM_OPERATEMODE, CfgValue::U8(0)),
        (PM_EXTINTWAKE, CfgValue::Bool(false)),
        (PM_EXTINTBACKUP, CfgValue::Bool(false)),
    ];
}
