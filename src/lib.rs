//! Inspect a universal Mach-O binary and rewrite the `current_version` of its
//! `LC_ID_DYLIB` commands in place.

pub mod endian;
pub mod error;
pub mod macho;
pub mod patch;
pub mod report;
pub mod version;
pub mod walker;

#[cfg(test)]
mod fixture;

pub use error::{Error, ErrorKind, Result};
pub use walker::{process, Options, SliceSummary};
