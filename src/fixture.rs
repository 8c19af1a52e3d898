//! Synthetic universal binaries for tests.

use crate::endian::SliceEndian;
use crate::macho::{FatArch, LC_ID_DYLIB, MH_MAGIC, MH_MAGIC_64};

pub struct Slice {
    pub cputype: u32,
    pub cpusubtype: i32,
    pub magic: u32,
    pub commands: Vec<Vec<u8>>,
}

impl Slice {
    pub fn new_64(cputype: u32, commands: Vec<Vec<u8>>) -> Self {
        Slice {
            cputype,
            cpusubtype: 3,
            magic: MH_MAGIC_64,
            commands,
        }
    }

    pub fn new_32(cputype: u32, commands: Vec<Vec<u8>>) -> Self {
        Slice {
            cputype,
            cpusubtype: 0,
            magic: MH_MAGIC,
            commands,
        }
    }

    fn image(&self, endian: SliceEndian) -> Vec<u8> {
        let sizeofcmds: usize = self.commands.iter().map(Vec::len).sum();
        let mut out = Vec::new();
        out.extend(endian.u32_to(self.magic));
        out.extend(endian.u32_to(self.cputype));
        out.extend(endian.u32_to(self.cpusubtype as u32));
        out.extend(endian.u32_to(6)); // MH_DYLIB
        out.extend(endian.u32_to(self.commands.len() as u32));
        out.extend(endian.u32_to(sizeofcmds as u32));
        out.extend(endian.u32_to(0));
        if self.magic == MH_MAGIC_64 {
            out.extend(endian.u32_to(0));
        }
        for command in &self.commands {
            out.extend(command);
        }
        // Some code after the commands so a stray write would show up.
        out.extend([0x90u8; 64]);
        out
    }
}

/// A load command with an arbitrary payload; `cmdsize` covers prefix and payload.
pub fn command(cmd: u32, payload: &[u8], endian: SliceEndian) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(endian.u32_to(cmd));
    out.extend(endian.u32_to((8 + payload.len()) as u32));
    out.extend(payload);
    out
}

/// An `LC_ID_DYLIB` naming `libdemo.dylib`.
pub fn id_dylib(current: u32, compatibility: u32, endian: SliceEndian) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend(endian.u32_to(24));
    payload.extend(endian.u32_to(2));
    payload.extend(endian.u32_to(current));
    payload.extend(endian.u32_to(compatibility));
    payload.extend(b"libdemo.dylib\0\0\0");
    command(LC_ID_DYLIB, &payload, endian)
}

/// Lays out the container: big-endian header and arch table, then each slice
/// on a 0x100 boundary.
pub fn fat(slices: &[Slice], endian: SliceEndian) -> Vec<u8> {
    let table_end = 8 + FatArch::SIZE * slices.len();
    let images: Vec<Vec<u8>> = slices.iter().map(|s| s.image(endian)).collect();

    let mut offsets = Vec::new();
    let mut next = align(table_end);
    for image in &images {
        offsets.push(next);
        next = align(next + image.len());
    }

    let mut out = Vec::new();
    out.extend(0xcafebabeu32.to_be_bytes());
    out.extend((slices.len() as u32).to_be_bytes());
    for ((slice, image), offset) in slices.iter().zip(&images).zip(&offsets) {
        out.extend(slice.cputype.to_be_bytes());
        out.extend((slice.cpusubtype as u32).to_be_bytes());
        out.extend((*offset as u32).to_be_bytes());
        out.extend((image.len() as u32).to_be_bytes());
        out.extend(8u32.to_be_bytes());
    }
    for (image, offset) in images.iter().zip(&offsets) {
        out.resize(*offset, 0);
        out.extend(image);
    }
    out
}

fn align(n: usize) -> usize {
    (n + 0xff) & !0xff
}
