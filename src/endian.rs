use clap::ValueEnum;

/// Byte order of the fields stored inside a slice: the image header, the
/// load-command prefix and the `LC_ID_DYLIB` sub-fields.
///
/// The fat header and the architecture table are always big-endian and do
/// not go through this type. `Host` reads slice fields exactly as they sit
/// in memory on the running machine, without any swap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SliceEndian {
    #[default]
    Host,
    Little,
    Big,
}

impl SliceEndian {
    pub fn u32_from(self, bytes: [u8; 4]) -> u32 {
        match self {
            SliceEndian::Host => u32::from_ne_bytes(bytes),
            SliceEndian::Little => u32::from_le_bytes(bytes),
            SliceEndian::Big => u32::from_be_bytes(bytes),
        }
    }

    pub fn u32_to(self, value: u32) -> [u8; 4] {
        match self {
            SliceEndian::Host => value.to_ne_bytes(),
            SliceEndian::Little => value.to_le_bytes(),
            SliceEndian::Big => value.to_be_bytes(),
        }
    }
}

/// Reads a `u32` at `at` inside a fixed record.
pub fn u32_at(buf: &[u8], at: usize, endian: SliceEndian) -> u32 {
    endian.u32_from([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

/// Reads a big-endian `u32` at `at`, as used by the fat header and arch table.
pub fn be_u32_at(buf: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_orders_decode_differently() {
        let bytes = [0x00, 0x01, 0x02, 0x03];
        assert_eq!(SliceEndian::Big.u32_from(bytes), 0x0001_0203);
        assert_eq!(SliceEndian::Little.u32_from(bytes), 0x0302_0100);
    }

    #[test]
    fn host_matches_native_layout() {
        let value = 0xfeed_facf;
        assert_eq!(SliceEndian::Host.u32_to(value), value.to_ne_bytes());
        assert_eq!(SliceEndian::Host.u32_from(value.to_ne_bytes()), value);
    }

    #[test]
    fn big_endian_field_reader() {
        let buf = [0xca, 0xfe, 0xba, 0xbe, 0, 0, 0, 2];
        assert_eq!(be_u32_at(&buf, 0), 0xcafe_babe);
        assert_eq!(be_u32_at(&buf, 4), 2);
        assert_eq!(u32_at(&buf, 4, SliceEndian::Big), 2);
    }
}
