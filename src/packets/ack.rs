use crate::error::Error;

pub const CLASS: u8 = 0x05;
pub const ACK_ID: u8 = 0x00;
pub const NAK_ID: u8 = 0x01;

const PAYLOAD_LEN: usize = 2;

/// Zero-copy view over an ACK-ACK or ACK-NAK payload: the class and message
/// id of the command being answered.
#[derive(Debug)]
pub struct AckRef<'a>(&'a [u8]);

impl<'a> AckRef<'a> {
    pub fn new(payload: &'a [u8]) -> Result<Self, Error> {
        if payload.len() < PAYLOAD_LEN {
            return Err(Error::InvalidPayloadLen {
                packet: "ACK",
                expect: PAYLOAD_LEN,
                got: payload.len(),
            });
        }
        Ok(Self(payload))
    }

    pub fn acked_class(&self) -> u8 {
        self.0[0]
    }

    pub fn acked_msg_id(&self) -> u8 {
        self.0[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_payload_names_the_command() {
        let ack = AckRef::new(&[0x06, 0x8a]).unwrap();
        assert_eq!(ack.acked_class(), 0x06);
        assert_eq!(ack.acked_msg_id(), 0x8a);
    }

    #[test]
    fn short_payload_is_rejected() {
        assert!(matches!(
            AckRef::new(&[0x06]),
            Err(Error::InvalidPayloadLen { .. })
        ));
    }
}
