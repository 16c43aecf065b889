use crate::error::Error;

pub const CLASS: u8 = 0x0a;
pub const MSG_ID: u8 = 0x04;

const SW_VERSION_LEN: usize = 30;
const HW_VERSION_LEN: usize = 10;
const EXTENSION_LEN: usize = 30;
const FIXED_LEN: usize = SW_VERSION_LEN + HW_VERSION_LEN;

/// Zero-copy view over a MON-VER payload: NUL-padded software and hardware
/// version strings followed by optional 30-byte extension strings.
#[derive(Debug)]
pub struct MonVerRef<'a>(&'a [u8]);

impl<'a> MonVerRef<'a> {
    pub fn new(payload: &'a [u8]) -> Result<Self, Error> {
        if payload.len() < FIXED_LEN {
            return Err(Error::InvalidPayloadLen {
                packet: "MON-VER",
                expect: FIXED_LEN,
                got: payload.len(),
            });
        }
        Ok(Self(payload))
    }

    pub fn software_version(&self) -> &'a str {
        cstr_field(&self.0[..SW_VERSION_LEN])
    }

    pub fn hardware_version(&self) -> &'a str {
        cstr_field(&self.0[SW_VERSION_LEN..FIXED_LEN])
    }

    /// Extended information strings (firmware, protocol version, enabled
    /// constellations).
    pub fn extensions(&self) -> impl Iterator<Item = &'a str> {
        self.0[FIXED_LEN..]
            .chunks_exact(EXTENSION_LEN)
            .map(cstr_field)
    }
}

/// Interpret a NUL-padded field, tolerating non-UTF-8 garbage by cutting at
/// the first offending byte.
fn cstr_field(bytes: &[u8]) -> &str {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    match std::str::from_utf8(&bytes[..end]) {
        Ok(s) => s,
        Err(e) => std::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_with(sw: &str, hw: &str, extensions: &[&str]) -> Vec<u8> {
        let mut p = vec![0u8; FIXED_LEN + extensions.len() * EXTENSION_LEN];
        p[..sw.len()].copy_from_slice(sw.as_bytes());
        p[SW_VERSION_LEN..SW_VERSION_LEN + hw.len()].copy_from_slice(hw.as_bytes());
        for (i, ext) in extensions.iter().enumerate() {
            let at = FIXED_LEN + i * EXTENSION_LEN;
            p[at..at + ext.len()].copy_from_slice(ext.as_bytes());
        }
        p
    }

    #[test]
    fn versions_and_extensions_decode() {
        let payload = payload_with(
            "ROM SPG 5.10 (7b202e)",
            "000A0000",
            &["FWVER=SPG 5.10", "PROTVER=34.10", "GPS;GLO;GAL;BDS"],
        );
        let ver = MonVerRef::new(&payload).unwrap();
        assert_eq!(ver.software_version(), "ROM SPG 5.10 (7b202e)");
        assert_eq!(ver.hardware_version(), "000A0000");
        let exts: Vec<&str> = ver.extensions().collect();
        assert_eq!(exts, ["FWVER=SPG 5.10", "PROTVER=34.10", "GPS;GLO;GAL;BDS"]);
    }

    #[test]
    fn payload_without_extensions_is_valid() {
        let payload = payload_with("EXT CORE 1.00", "00190000", &[]);
        let ver = MonVerRef::new(&payload).unwrap();
        assert_eq!(ver.extensions().count(), 0);
    }

    #[test]
    fn short_payload_is_rejected() {
        let err = MonVerRef::new(&[0u8; 12]).unwrap_err();
        assert!(matches!(err, Error::InvalidPayloadLen { .. }));
    }
}
