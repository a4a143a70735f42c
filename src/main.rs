use anyhow::{Context, Result};
use clap::{error::ErrorKind, Parser, Subcommand};
use log::{debug, info, warn};
use std::ffi::OsString;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

mod chr;

const MSG_NO_COMMAND: &str = "No command or unsupported command is given";
const MSG_NO_FILENAMES: &str = "No filenames are given";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Dump NES CHR-ROM tiles to PNG spritesheets",
    disable_help_subcommand = true
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the tiles of each ROM to <ROM>-0.png, <ROM>-1.png, ... (256 tiles per sheet)
    Export {
        /// iNES or NES 2.0 ROM files. Everything after `export` is a path, even `-x.nes`.
        #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
        roms: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    run(std::env::args_os(), &mut io::stdout().lock())
}

fn run<I, T>(argv: I, out: &mut impl Write) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = match Args::try_parse_from(argv) {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            debug!("{err}");
            return say(out, format_args!("{MSG_NO_COMMAND}"));
        }
    };

    let Some(Command::Export { roms }) = args.command else {
        return say(out, format_args!("{MSG_NO_COMMAND}"));
    };

    if roms.is_empty() {
        return say(out, format_args!("{MSG_NO_FILENAMES}"));
    }

    // A failing ROM is reported and the batch goes on.
    for rom in &roms {
        match chr::export_rom(rom) {
            Ok(count) => info!("{}: {count} spritesheet(s)", rom.display()),
            Err(err) => {
                warn!("{}: {err:?}", rom.display());
                say(out, format_args!("{}: {err}", rom.display()))?;
            }
        }
    }

    Ok(())
}

fn say(out: &mut impl Write, line: fmt::Arguments<'_>) -> Result<()> {
    writeln!(out, "{line}").context("writing to stdout")
}
