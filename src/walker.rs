//! Walks a universal binary top-down: container header, architecture table,
//! then the image header and load commands of each slice, optionally
//! rewriting the `current_version` of every `LC_ID_DYLIB` on the way.
//!
//! The stream cursor is the only state carried between steps and it is
//! repositioned explicitly before each structured read or write.

use crate::endian::SliceEndian;
use crate::error::{Error, Result, Stage};
use crate::macho::{
    CommandKind, DylibIdentity, FatArch, FatHeader, LoadCommand, MachHeader, FAT_MAGIC,
};
use crate::patch::{Patch, PatchWriter};
use crate::report::Reporter;
use crate::version::Version;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
    /// `None` inspects only.
    pub version: Option<Version>,
    pub endian: SliceEndian,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandRecord {
    pub base: u64,
    pub cmd: u32,
    pub cmdsize: u32,
}

/// What was seen (and written) while walking one slice.
#[derive(Debug)]
pub struct SliceSummary {
    /// 1-based position in the architecture table.
    pub index: usize,
    pub arch: FatArch,
    pub header: MachHeader,
    /// Absolute offset of the first load command.
    pub header_end: u64,
    pub commands: Vec<CommandRecord>,
    /// Cursor position once every command has been skipped over.
    pub end: u64,
    pub identities: Vec<DylibIdentity>,
    pub patches: Vec<Patch>,
}

pub fn open_target(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })
}

pub fn read_fat_header<R: Read + Seek>(stream: &mut R) -> Result<FatHeader> {
    let mut buf = [0u8; FatHeader::SIZE];
    stream
        .seek(SeekFrom::Start(0))
        .map_err(Error::io(Stage::FatHeader))?;
    stream.read_exact(&mut buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::NotFatBinary { magic: None },
        _ => Error::Io {
            stage: Stage::FatHeader,
            source: e,
        },
    })?;

    let header = FatHeader::from_bytes(&buf);
    if header.magic != FAT_MAGIC {
        return Err(Error::NotFatBinary {
            magic: Some(header.magic),
        });
    }
    Ok(header)
}

/// Reads `count` descriptors from the current position, which must be right
/// after the fat header.
pub fn read_arch_table<R: Read>(stream: &mut R, count: u32) -> Result<Vec<FatArch>> {
    let mut archs = Vec::new();
    for _ in 0..count {
        let mut buf = [0u8; FatArch::SIZE];
        stream
            .read_exact(&mut buf)
            .map_err(|e| Error::read(Stage::ArchTable, e))?;
        archs.push(FatArch::from_bytes(&buf));
    }
    Ok(archs)
}

/// Reads and validates the image header of a slice, leaving the cursor on
/// its first load command.
pub fn read_slice_header<R: Read + Seek>(
    stream: &mut R,
    index: usize,
    arch: &FatArch,
    endian: SliceEndian,
) -> Result<MachHeader> {
    let offset = arch.offset as u64;
    stream
        .seek(SeekFrom::Start(offset))
        .map_err(Error::io(Stage::SliceHeader))?;

    let mut buf = [0u8; MachHeader::SIZE];
    stream
        .read_exact(&mut buf)
        .map_err(|e| Error::read(Stage::SliceHeader, e))?;

    let header = MachHeader::from_bytes(&buf, endian);
    if !header.is_recognized() {
        return Err(Error::NotMachO {
            arch: index,
            magic: header.magic,
        });
    }

    stream
        .seek(SeekFrom::Start(offset + header.width()))
        .map_err(Error::io(Stage::SliceHeader))?;
    Ok(header)
}

/// Iterates `header.ncmds` load commands starting at the cursor.
///
/// The next command is always found at `base + cmdsize`, whatever was
/// parsed of the current one.
pub fn walk_load_commands<S, R>(
    stream: &mut S,
    header: &MachHeader,
    options: &Options,
    reporter: &mut R,
) -> Result<(Vec<CommandRecord>, Vec<DylibIdentity>, Vec<Patch>)>
where
    S: Read + Write + Seek,
    R: Reporter + ?Sized,
{
    let endian = options.endian;
    let mut commands = Vec::new();
    let mut identities = Vec::new();
    let mut patches = Vec::new();

    for _ in 0..header.ncmds {
        let base = stream
            .stream_position()
            .map_err(Error::io(Stage::LoadCommand))?;

        let mut buf = [0u8; LoadCommand::SIZE];
        stream
            .read_exact(&mut buf)
            .map_err(|e| Error::read(Stage::LoadCommand, e))?;
        let command = LoadCommand::from_bytes(&buf, endian);
        commands.push(CommandRecord {
            base,
            cmd: command.cmd,
            cmdsize: command.cmdsize,
        });

        match command.kind() {
            CommandKind::IdDylib => {
                let mut buf = [0u8; DylibIdentity::SIZE];
                stream
                    .read_exact(&mut buf)
                    .map_err(|e| Error::read(Stage::DylibIdentity, e))?;
                let identity = DylibIdentity::from_bytes(&buf, endian);
                reporter.dylib_identity(&identity);

                if let Some(version) = options.version {
                    let value = version.pack();
                    let patch = Patch::current_version(base, value, endian);
                    PatchWriter::new(stream)
                        .apply(&patch)
                        .map_err(Error::io(Stage::Patch))?;
                    reporter.version_patched(identity.current_version, value);
                    patches.push(patch);
                }
                identities.push(identity);
            }
            kind => reporter.load_command(kind),
        }

        stream
            .seek(SeekFrom::Start(base + command.cmdsize as u64))
            .map_err(Error::io(Stage::LoadCommand))?;
    }

    Ok((commands, identities, patches))
}

/// Runs the whole walk. Stops at the first error; writes already made to
/// earlier slices stay in place.
pub fn process<S, R>(stream: &mut S, options: &Options, reporter: &mut R) -> Result<Vec<SliceSummary>>
where
    S: Read + Write + Seek,
    R: Reporter + ?Sized,
{
    let fat = read_fat_header(stream)?;
    reporter.architecture_count(fat.nfat_arch);
    let archs = read_arch_table(stream, fat.nfat_arch)?;

    let mut summaries = Vec::with_capacity(archs.len());
    for (i, arch) in archs.into_iter().enumerate() {
        let index = i + 1;
        reporter.architecture(index, &arch);

        let header = read_slice_header(stream, index, &arch, options.endian)?;
        reporter.slice_header(&header);
        let header_end = arch.offset as u64 + header.width();

        let (commands, identities, patches) =
            walk_load_commands(stream, &header, options, reporter)?;
        if options.version.is_some() && identities.is_empty() {
            reporter.no_dylib_identity(index);
        }

        let end = stream
            .stream_position()
            .map_err(Error::io(Stage::LoadCommand))?;
        summaries.push(SliceSummary {
            index,
            arch,
            header,
            header_end,
            commands,
            end,
            identities,
            patches,
        });
    }
    Ok(summaries)
}
