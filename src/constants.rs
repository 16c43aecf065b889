use std::time::Duration;

pub const UBX_SYNC_CHAR_1: u8 = 0xb5;
pub const UBX_SYNC_CHAR_2: u8 = 0x62;
pub(crate) const UBX_SYNC_LEN: usize = 2;
pub(crate) const UBX_CLASS_LEN: usize = 1;
pub(crate) const UBX_MSG_ID_LEN: usize = 1;
pub(crate) const UBX_PAYLOAD_SIZE_LEN: usize = 2;
pub(crate) const UBX_HEADER_LEN: usize =
    UBX_SYNC_LEN + UBX_CLASS_LEN + UBX_MSG_ID_LEN + UBX_PAYLOAD_SIZE_LEN;
pub(crate) const UBX_CHECKSUM_LEN: usize = 2;

pub(crate) const UBX_CLASS_OFFSET: usize = 2;
pub(crate) const UBX_MSG_ID_OFFSET: usize = 3;
pub(crate) const UBX_LENGTH_OFFSET: usize = 4;

/// Fill byte returned by the receiver's bus interface when no message is
/// staged. A full header of these means "no data yet", not a frame.
pub(crate) const BUS_IDLE_BYTE: u8 = 0xff;

/// Pause between writing a command and reading back the response. The
/// receiver firmware needs this long to stage its reply on the bus; it is a
/// correctness requirement, not a tuning knob.
pub(crate) const COMMAND_SETTLE_DELAY: Duration = Duration::from_millis(500);
