use anyhow::Context;
use clap::Parser;
use crossterm::style::Stylize;
use inquire::Confirm;
use patch_dylib_version_rs::{
    endian::SliceEndian, process, report::ConsoleReporter, version::Version, walker::open_target,
    Options,
};
use std::{fs::metadata, path::Path, process::exit};

#[derive(Parser, Debug)]
#[command(about = "Inspect a fat Mach-O dylib and patch its current version in place")]
struct Args {
    /// The fat binary to inspect or patch
    input_file: String,
    /// New major version; omit it (or pass a negative value) to only inspect
    #[arg(allow_negative_numbers = true)]
    major: Option<i64>,
    /// New minor version
    #[arg(default_value_t = 0, allow_negative_numbers = true)]
    minor: i64,
    /// New patch version
    #[arg(default_value_t = 0, allow_negative_numbers = true)]
    patch: i64,
    /// Copy the input here and patch the copy instead
    #[arg(long, short)]
    output_file: Option<String>,
    /// Run without asking for confirmation
    #[arg(long, short('y'))]
    all_yes: bool,
    /// Byte order of the fields inside each slice
    #[arg(long, value_enum, default_value_t = SliceEndian::Host)]
    slice_endian: SliceEndian,
    /// Do not list every load command
    #[arg(long, short)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();

    if !Path::new(&args.input_file).exists() {
        eprintln!("Input file does not exist");
        exit(1);
    }

    match metadata(&args.input_file) {
        Ok(meta) if meta.is_file() => {}
        _ => {
            eprintln!("Input file is not a file");
            exit(1);
        }
    }

    if let Err(err) = args.run() {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        exit(1);
    }
}

trait Utils {
    fn ask_for_confirmation(&self, msg: &str) -> anyhow::Result<bool>;
    fn options(&self) -> Options;
    fn target(&self) -> anyhow::Result<Option<String>>;
    fn run(&self) -> anyhow::Result<()>;
}

impl Utils for Args {
    fn ask_for_confirmation(&self, msg: &str) -> anyhow::Result<bool> {
        if self.all_yes {
            return Ok(true);
        }

        Ok(Confirm::new(msg).with_default(true).prompt()?)
    }

    fn options(&self) -> Options {
        let version = match self.major {
            Some(major) if major >= 0 => Some(Version::new(
                major as u32,
                self.minor as u32,
                self.patch as u32,
            )),
            _ => None,
        };
        Options {
            version,
            endian: self.slice_endian,
        }
    }

    /// The file to walk, or `None` if the user backed out.
    fn target(&self) -> anyhow::Result<Option<String>> {
        if self.options().version.is_none() {
            return Ok(Some(self.input_file.clone()));
        }

        match &self.output_file {
            Some(output_file) => {
                if Path::new(output_file).exists()
                    && !self.ask_for_confirmation(&format!(
                        "Output file `{}` already exists, overwrite?",
                        output_file
                    ))?
                {
                    return Ok(None);
                }
                std::fs::copy(&self.input_file, output_file).with_context(|| {
                    format!("failed to copy `{}` to `{}`", self.input_file, output_file)
                })?;
                Ok(Some(output_file.clone()))
            }
            None => {
                if !self.ask_for_confirmation(&format!(
                    "Input file `{}` will be modified in place, continue?",
                    self.input_file
                ))? {
                    return Ok(None);
                }
                Ok(Some(self.input_file.clone()))
            }
        }
    }

    fn run(&self) -> anyhow::Result<()> {
        let Some(target) = self.target()? else {
            return Ok(());
        };

        let options = self.options();
        let mut file = open_target(Path::new(&target))?;
        let mut reporter = ConsoleReporter { quiet: self.quiet };
        let summaries = process(&mut file, &options, &mut reporter)
            .with_context(|| format!("failed to process `{}`", target))?;

        let patched: usize = summaries.iter().map(|s| s.patches.len()).sum();
        println!(
            "{} architecture(s) processed, {} LC_ID_DYLIB patched",
            summaries.len(),
            patched
        );
        println!("{}", "Done!".green().bold());
        Ok(())
    }
}
