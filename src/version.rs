use std::fmt;

/// A `major.minor.patch` triple as stored in a dylib command.
///
/// Packing keeps the low byte of each component, so out-of-range input
/// wraps instead of failing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    pub fn pack(&self) -> u32 {
        (self.major & 0xff) << 16 | (self.minor & 0xff) << 8 | (self.patch & 0xff)
    }

    pub fn unpack(raw: u32) -> Self {
        Version {
            major: raw >> 16,
            minor: (raw >> 8) & 0xff,
            patch: raw & 0xff,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_components_into_bytes() {
        assert_eq!(Version::new(2, 0, 0).pack(), 0x0002_0000);
        assert_eq!(Version::new(1, 2, 3).pack(), 0x0001_0203);
    }

    #[test]
    fn out_of_range_components_wrap() {
        assert_eq!(Version::new(0x102, 0x1ff, 256).pack(), 0x0002_ff00);
    }

    #[test]
    fn unpacks_and_displays() {
        let version = Version::unpack(0x0001_0203);
        assert_eq!(version, Version::new(1, 2, 3));
        assert_eq!(version.to_string(), "1.2.3");
        // Real-world dylibs use a 16-bit major.
        assert_eq!(Version::unpack(0x04b0_0000).to_string(), "1200.0.0");
    }
}
