//! Errors raised while walking or patching a universal binary.
//!
//! Every variant is fatal: the walk stops at the first one and nothing that
//! was already written is rolled back.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Where in the walk a read, seek or write failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    FatHeader,
    ArchTable,
    SliceHeader,
    LoadCommand,
    DylibIdentity,
    Patch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::FatHeader => "fat header",
            Stage::ArchTable => "architecture table",
            Stage::SliceHeader => "Mach-O header",
            Stage::LoadCommand => "load command",
            Stage::DylibIdentity => "LC_ID_DYLIB payload",
            Stage::Patch => "version patch",
        })
    }
}

/// Coarse classification used by callers that only care about the family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Open,
    Format,
    Io,
}

#[derive(Debug, Error)]
pub enum Error {
    /// The target could not be opened for reading and writing.
    #[error("failed to open `{}`: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    /// The container header is short or its magic is wrong.
    /// `magic` is `None` when the header itself could not be read.
    #[error("not a valid fat binary")]
    NotFatBinary { magic: Option<u32> },

    #[error("architecture #{arch}: not a valid Mach-O file (magic {magic:#010x})")]
    NotMachO { arch: usize, magic: u32 },

    /// A fixed-size record ended before all of its bytes could be read.
    #[error("failed to read {stage}: {source}")]
    ShortRead { stage: Stage, source: io::Error },

    #[error("I/O error during {stage}: {source}")]
    Io { stage: Stage, source: io::Error },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Open { .. } => ErrorKind::Open,
            Error::NotFatBinary { .. } | Error::NotMachO { .. } | Error::ShortRead { .. } => {
                ErrorKind::Format
            }
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    /// Classifies a failed `read_exact`: running out of bytes is a format
    /// problem, anything else is plain I/O.
    pub fn read(stage: Stage, source: io::Error) -> Error {
        if source.kind() == io::ErrorKind::UnexpectedEof {
            Error::ShortRead { stage, source }
        } else {
            Error::Io { stage, source }
        }
    }

    pub fn io(stage: Stage) -> impl FnOnce(io::Error) -> Error {
        move |source| Error::Io { stage, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eof_is_a_format_error() {
        let err = Error::read(
            Stage::LoadCommand,
            io::Error::from(io::ErrorKind::UnexpectedEof),
        );
        assert!(matches!(err, Error::ShortRead { stage: Stage::LoadCommand, .. }));
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn other_read_failures_are_io() {
        let err = Error::read(
            Stage::SliceHeader,
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn messages_name_the_stage() {
        let err = Error::read(
            Stage::ArchTable,
            io::Error::from(io::ErrorKind::UnexpectedEof),
        );
        assert!(err.to_string().starts_with("failed to read architecture table"));

        let err = Error::NotMachO {
            arch: 2,
            magic: 0xdeadbeef,
        };
        assert_eq!(
            err.to_string(),
            "architecture #2: not a valid Mach-O file (magic 0xdeadbeef)"
        );
    }
}
