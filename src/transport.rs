use std::io;

/// Blocking byte transport to the binary receiver.
///
/// The receiver sits behind an addressed two-wire bus (or any byte pipe that
/// behaves like one). The session owns the handle for its lifetime; nothing
/// here serializes concurrent access to the same physical device.
pub trait UbxTransport {
    /// Write one encoded frame to the receiver.
    fn write_frame(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Read up to `buf.len()` bytes, returning how many arrived. A short
    /// count means the bus had nothing more to give; the engine decides
    /// whether that is idle or a truncated frame.
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Any `Read + Write` handle (a serial port, a bus character device, a mock)
/// works as a transport. Timeouts are reported as a short read, matching bus
/// semantics where silence is data exhaustion rather than failure.
impl<T: io::Read + io::Write> UbxTransport for T {
    fn write_frame(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_all(bytes)
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}
