use crate::macho::{CommandKind, DylibIdentity, FatArch, MachHeader};
use crate::version::Version;
use crossterm::style::Stylize;

/// Receives the facts produced by the walk, in the order they are found.
pub trait Reporter {
    fn architecture_count(&mut self, count: u32);
    fn architecture(&mut self, index: usize, arch: &FatArch);
    fn slice_header(&mut self, header: &MachHeader);
    fn load_command(&mut self, kind: CommandKind);
    fn dylib_identity(&mut self, identity: &DylibIdentity);
    fn version_patched(&mut self, old: u32, new: u32);
    fn no_dylib_identity(&mut self, index: usize);
}

pub struct ConsoleReporter {
    pub quiet: bool,
}

impl ConsoleReporter {
    fn slice_line(arch: &FatArch) -> String {
        format!(
            " Offset: {:#x}, Size: {} bytes, Align: 2^{}",
            arch.offset, arch.size, arch.align
        )
    }

    fn header_line(header: &MachHeader) -> String {
        format!(
            " Number of Load Commands: {} ({} bytes), File Type: {:#x}, Flags: {:#010x}",
            header.ncmds, header.sizeofcmds, header.filetype, header.flags
        )
    }

    /// `None` when the line is suppressed by `quiet`.
    fn command_line(&self, kind: CommandKind) -> Option<String> {
        if self.quiet {
            return None;
        }
        match kind {
            CommandKind::Unhandled(cmd) => {
                Some(format!("   Unknown or unhandled command: {:#x}", cmd))
            }
            named => named.name().map(|name| format!("   {}", name)),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn architecture_count(&mut self, count: u32) {
        println!("Number of Architectures: {}", count.to_string().red());
    }

    fn architecture(&mut self, index: usize, arch: &FatArch) {
        println!("Architecture #{}:", index);
        println!(
            "CPU Type: {}, CPU Subtype: {}",
            arch.cputype.to_string().red(),
            arch.cpusubtype
        );
        println!("{}", Self::slice_line(arch));
    }

    fn slice_header(&mut self, header: &MachHeader) {
        println!("{}", Self::header_line(header));
    }

    fn load_command(&mut self, kind: CommandKind) {
        if let Some(line) = self.command_line(kind) {
            println!("{}", line);
        }
    }

    fn dylib_identity(&mut self, identity: &DylibIdentity) {
        println!("   {} found.", "LC_ID_DYLIB".green());
        println!(
            "    timestamp: {} current version: {} ({}) compatibility version: {} ({})",
            identity.timestamp,
            identity.current_version,
            Version::unpack(identity.current_version),
            identity.compatibility_version,
            Version::unpack(identity.compatibility_version),
        );
    }

    fn version_patched(&mut self, old: u32, new: u32) {
        println!(
            "     version patched: {} -> {}",
            Version::unpack(old),
            Version::unpack(new).to_string().green().bold()
        );
    }

    fn no_dylib_identity(&mut self, index: usize) {
        eprintln!(
            "{} architecture #{} has no LC_ID_DYLIB, nothing to patch",
            "warning:".yellow(),
            index
        );
    }
}
