use crate::checksum::ChecksumCalc;
use crate::constants::{
    BUS_IDLE_BYTE, UBX_CHECKSUM_LEN, UBX_CLASS_OFFSET, UBX_HEADER_LEN, UBX_LENGTH_OFFSET,
    UBX_MSG_ID_OFFSET, UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2,
};
use crate::error::FrameError;

/// One UBX frame: class, message id and payload. Built per command and
/// discarded after the round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UbxFrame {
    pub class: u8,
    pub msg_id: u8,
    pub payload: Vec<u8>,
}

impl UbxFrame {
    pub fn new(class: u8, msg_id: u8, payload: Vec<u8>) -> Self {
        Self {
            class,
            msg_id,
            payload,
        }
    }

    pub fn is(&self, class: u8, msg_id: u8) -> bool {
        self.class == class && self.msg_id == msg_id
    }

    /// Serialize to wire bytes: preamble, class, id, little-endian payload
    /// length, payload, checksum pair. The preamble is excluded from the
    /// checksum.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(UBX_HEADER_LEN + self.payload.len() + UBX_CHECKSUM_LEN);
        out.push(UBX_SYNC_CHAR_1);
        out.push(UBX_SYNC_CHAR_2);
        out.push(self.class);
        out.push(self.msg_id);
        out.extend_from_slice(&(self.payload.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.payload);
        let (ck_a, ck_b) = ChecksumCalc::of(&out[UBX_CLASS_OFFSET..]);
        out.push(ck_a);
        out.push(ck_b);
        out
    }

    /// Validate a complete wire frame and take ownership of its payload.
    ///
    /// The checksum is recomputed over class, id, length and payload and
    /// compared against the trailing pair.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < UBX_HEADER_LEN {
            return Err(FrameError::Truncated {
                expect: UBX_HEADER_LEN,
                got: bytes.len(),
            });
        }
        if bytes[0] != UBX_SYNC_CHAR_1 || bytes[1] != UBX_SYNC_CHAR_2 {
            return Err(FrameError::InvalidSync);
        }
        let payload_len =
            u16::from_le_bytes([bytes[UBX_LENGTH_OFFSET], bytes[UBX_LENGTH_OFFSET + 1]]) as usize;
        let total = UBX_HEADER_LEN + payload_len + UBX_CHECKSUM_LEN;
        if bytes.len() < total {
            return Err(FrameError::Truncated {
                expect: total,
                got: bytes.len(),
            });
        }
        let checksum_at = UBX_HEADER_LEN + payload_len;
        let mut calc = ChecksumCalc::new();
        calc.update(&bytes[UBX_CLASS_OFFSET..checksum_at]);
        calc.validate(bytes[checksum_at], bytes[checksum_at + 1])?;

        Ok(Self {
            class: bytes[UBX_CLASS_OFFSET],
            msg_id: bytes[UBX_MSG_ID_OFFSET],
            payload: bytes[UBX_HEADER_LEN..checksum_at].to_vec(),
        })
    }

    /// A full header read of the bus fill byte means the receiver has
    /// nothing staged; it must not be mistaken for a zero-length frame.
    pub(crate) fn header_is_idle(header: &[u8]) -> bool {
        header.iter().all(|b| *b == BUS_IDLE_BYTE)
    }
}
