//! On-disk layouts of the universal container and of the parts of a Mach-O
//! slice this tool touches.
//!
//! Records are decoded field by field from fixed-size byte arrays. Offsets
//! below are relative to the start of each record.

use crate::endian::{be_u32_at, u32_at, SliceEndian};
use std::fmt;

pub use goblin::mach::cputype::{CPU_TYPE_ARM, CPU_TYPE_ARM64, CPU_TYPE_X86, CPU_TYPE_X86_64};
pub use goblin::mach::fat::FAT_MAGIC;
pub use goblin::mach::header::{MH_MAGIC, MH_MAGIC_64};
pub use goblin::mach::load_command::{
    LC_DYSYMTAB, LC_ID_DYLIB, LC_LOAD_DYLIB, LC_LOAD_DYLINKER, LC_SEGMENT, LC_SYMTAB,
    LC_UNIXTHREAD,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CpuType {
    X86,
    X86_64,
    Arm,
    Arm64,
    Unknown(i32),
}

impl From<i32> for CpuType {
    fn from(raw: i32) -> Self {
        match raw as u32 {
            CPU_TYPE_X86 => CpuType::X86,
            CPU_TYPE_X86_64 => CpuType::X86_64,
            CPU_TYPE_ARM => CpuType::Arm,
            CPU_TYPE_ARM64 => CpuType::Arm64,
            _ => CpuType::Unknown(raw),
        }
    }
}

impl fmt::Display for CpuType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuType::X86 => f.write_str("x86"),
            CpuType::X86_64 => f.write_str("x86_64"),
            CpuType::Arm => f.write_str("ARM"),
            CpuType::Arm64 => f.write_str("ARM64"),
            CpuType::Unknown(raw) => write!(f, "unknown ({})", raw),
        }
    }
}

/// `magic` at 0, `nfat_arch` at 4, both big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatHeader {
    pub magic: u32,
    pub nfat_arch: u32,
}

impl FatHeader {
    pub const SIZE: usize = 8;

    pub fn from_bytes(buf: &[u8; Self::SIZE]) -> FatHeader {
        FatHeader {
            magic: be_u32_at(buf, 0),
            nfat_arch: be_u32_at(buf, 4),
        }
    }
}

/// One entry of the architecture table: `cputype` at 0, `cpusubtype` at 4,
/// `offset` at 8, `size` at 12, `align` at 16, all big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatArch {
    pub cputype: CpuType,
    pub cpusubtype: i32,
    pub offset: u32,
    pub size: u32,
    pub align: u32,
}

impl FatArch {
    pub const SIZE: usize = 20;

    pub fn from_bytes(buf: &[u8; Self::SIZE]) -> FatArch {
        FatArch {
            cputype: CpuType::from(be_u32_at(buf, 0) as i32),
            cpusubtype: be_u32_at(buf, 4) as i32,
            offset: be_u32_at(buf, 8),
            size: be_u32_at(buf, 12),
            align: be_u32_at(buf, 16),
        }
    }
}

/// The part of `mach_header` shared by both variants: `magic` at 0,
/// `cputype` at 4, `cpusubtype` at 8, `filetype` at 12, `ncmds` at 16,
/// `sizeofcmds` at 20, `flags` at 24. The 64-bit variant carries four more
/// reserved bytes, which only matter for [`MachHeader::width`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachHeader {
    pub magic: u32,
    pub filetype: u32,
    pub ncmds: u32,
    pub sizeofcmds: u32,
    pub flags: u32,
}

impl MachHeader {
    pub const SIZE: usize = 28;
    pub const SIZE_64: usize = 32;

    pub fn from_bytes(buf: &[u8; Self::SIZE], endian: SliceEndian) -> MachHeader {
        MachHeader {
            magic: u32_at(buf, 0, endian),
            filetype: u32_at(buf, 12, endian),
            ncmds: u32_at(buf, 16, endian),
            sizeofcmds: u32_at(buf, 20, endian),
            flags: u32_at(buf, 24, endian),
        }
    }

    pub fn is_recognized(&self) -> bool {
        self.magic == MH_MAGIC || self.magic == MH_MAGIC_64
    }

    /// Byte width of the header, i.e. the distance to the first load command.
    pub fn width(&self) -> u64 {
        if self.magic == MH_MAGIC_64 {
            Self::SIZE_64 as u64
        } else {
            Self::SIZE as u64
        }
    }
}

/// Generic prefix of every load command: `cmd` at 0, `cmdsize` at 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadCommand {
    pub cmd: u32,
    pub cmdsize: u32,
}

impl LoadCommand {
    pub const SIZE: usize = 8;

    pub fn from_bytes(buf: &[u8; Self::SIZE], endian: SliceEndian) -> LoadCommand {
        LoadCommand {
            cmd: u32_at(buf, 0, endian),
            cmdsize: u32_at(buf, 4, endian),
        }
    }

    pub fn kind(&self) -> CommandKind {
        CommandKind::from(self.cmd)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    Segment,
    Symtab,
    Dysymtab,
    LoadDylinker,
    IdDylib,
    LoadDylib,
    UnixThread,
    Unhandled(u32),
}

impl From<u32> for CommandKind {
    fn from(cmd: u32) -> Self {
        match cmd {
            LC_SEGMENT => CommandKind::Segment,
            LC_SYMTAB => CommandKind::Symtab,
            LC_DYSYMTAB => CommandKind::Dysymtab,
            LC_LOAD_DYLINKER => CommandKind::LoadDylinker,
            LC_ID_DYLIB => CommandKind::IdDylib,
            LC_LOAD_DYLIB => CommandKind::LoadDylib,
            LC_UNIXTHREAD => CommandKind::UnixThread,
            other => CommandKind::Unhandled(other),
        }
    }
}

impl CommandKind {
    pub fn name(&self) -> Option<&'static str> {
        match self {
            CommandKind::Segment => Some("LC_SEGMENT"),
            CommandKind::Symtab => Some("LC_SYMTAB"),
            CommandKind::Dysymtab => Some("LC_DYSYMTAB"),
            CommandKind::LoadDylinker => Some("LC_LOAD_DYLINKER"),
            CommandKind::IdDylib => Some("LC_ID_DYLIB"),
            CommandKind::LoadDylib => Some("LC_LOAD_DYLIB"),
            CommandKind::UnixThread => Some("LC_UNIXTHREAD"),
            CommandKind::Unhandled(_) => None,
        }
    }
}

/// Payload of `LC_ID_DYLIB` right after the generic prefix: `name` offset at
/// 0, `timestamp` at 4, `current_version` at 8, `compatibility_version` at 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DylibIdentity {
    pub name_offset: u32,
    pub timestamp: u32,
    pub current_version: u32,
    pub compatibility_version: u32,
}

impl DylibIdentity {
    pub const SIZE: usize = 16;
    /// Offset of `current_version` from the start of the whole command.
    pub const CURRENT_VERSION_OFFSET: u64 = LoadCommand::SIZE as u64 + 8;

    pub fn from_bytes(buf: &[u8; Self::SIZE], endian: SliceEndian) -> DylibIdentity {
        DylibIdentity {
            name_offset: u32_at(buf, 0, endian),
            timestamp: u32_at(buf, 4, endian),
            current_version: u32_at(buf, 8, endian),
            compatibility_version: u32_at(buf, 12, endian),
        }
    }
}
