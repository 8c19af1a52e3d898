use crate::endian::SliceEndian;
use crate::macho::DylibIdentity;
use std::io::{self, Seek, SeekFrom, Write};

/// A 4-byte overwrite at an absolute file offset. This is the only kind of
/// write the tool ever performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Patch {
    pub offset: u64,
    pub bytes: [u8; 4],
}

impl Patch {
    /// Targets the `current_version` field of the `LC_ID_DYLIB` command that
    /// starts at `command_base`.
    pub fn current_version(command_base: u64, value: u32, endian: SliceEndian) -> Patch {
        Patch {
            offset: command_base + DylibIdentity::CURRENT_VERSION_OFFSET,
            bytes: endian.u32_to(value),
        }
    }
}

/// Scoped write access to the target stream. Holding one borrows the stream
/// mutably, so reads cannot interleave with a half-applied patch.
pub struct PatchWriter<'a, W: Write + Seek> {
    inner: &'a mut W,
}

impl<'a, W: Write + Seek> PatchWriter<'a, W> {
    pub fn new(inner: &'a mut W) -> Self {
        PatchWriter { inner }
    }

    pub fn apply(&mut self, patch: &Patch) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(patch.offset))?;
        self.inner.write_all(&patch.bytes)?;
        self.inner.flush()
    }
}
