use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod cli;

/// Move files out of Git LFS by rewriting history.
///
/// `unlfs export` walks the selected history, replaces every LFS pointer
/// matching --include with the object it points to, and adds a
/// `text -filter -merge -diff` line for each pattern to the root
/// .gitattributes of every rewritten commit. Objects must already be in the
/// local LFS store (run `git lfs fetch --all` first).
///
/// EXAMPLES:
///
///   # Export all .bin files on the current branch
///   unlfs export --include="*.bin"
///
///   # Export everything except PSDs, on every branch and tag
///   unlfs export --everything --include="*" --exclude="*.psd"
///
///   # Keep a record of old and new commit ids
///   unlfs export --include="assets/" --object-map=map.csv main
#[derive(Parser)]
#[command(name = "unlfs")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'unlfs <command> --help' for more information on a specific command.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite history, replacing LFS pointers with their content
    ///
    /// Refs are only updated once every selected commit has been rewritten.
    /// Afterwards the working tree is force-checked-out at the new HEAD.
    Export(cli::ExportArgs),
}

fn main() -> ExitCode {
    unlfs::telemetry::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Export(args) => cli::run(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}
