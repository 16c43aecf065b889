use crate::error::FrameError;

/// UBX [Fletcher-16](https://en.wikipedia.org/wiki/Fletcher%27s_checksum)
/// running-sum pair. An 8-bit accumulator check, not cryptographic: it
/// catches single-byte corruption, not tampering.
#[derive(Default)]
pub(crate) struct ChecksumCalc {
    ck_a: u8,
    ck_b: u8,
}

impl ChecksumCalc {
    pub(crate) const fn new() -> Self {
        Self { ck_a: 0, ck_b: 0 }
    }

    pub(crate) const fn update(&mut self, bytes: &[u8]) {
        let mut i = 0;
        while i < bytes.len() {
            self.update_byte(bytes[i]);
            i += 1;
        }
    }

    pub(crate) const fn update_byte(&mut self, byte: u8) {
        self.ck_a = self.ck_a.wrapping_add(byte);
        self.ck_b = self.ck_b.wrapping_add(self.ck_a);
    }

    pub(crate) const fn result(self) -> (u8, u8) {
        (self.ck_a, self.ck_b)
    }

    /// Compare against the checksum pair received on the wire.
    pub(crate) const fn validate(self, received_ck_a: u8, received_ck_b: u8) -> Result<(), FrameError> {
        if self.ck_a == received_ck_a && self.ck_b == received_ck_b {
            Ok(())
        } else {
            Err(FrameError::ChecksumMismatch {
                expect: u16::from_le_bytes([received_ck_a, received_ck_b]),
                got: u16::from_le_bytes([self.ck_a, self.ck_b]),
            })
        }
    }

    /// Checksum over class, id, length and payload in one go.
    pub(crate) const fn of(framed: &[u8]) -> (u8, u8) {
        let mut calc = Self::new();
        calc.update(framed);
        calc.result()
    }
}
