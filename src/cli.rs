use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use tracing::instrument;
use unlfs::config::UnlfsConfig;
use unlfs::export::{ExportRequest, run_export};
use unlfs::selection::RefSelection;
use unlfs_git::{GitRepo as _, GixRepo};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Refs or revisions to rewrite (default: the current branch).
    #[arg(value_name = "REF")]
    refs: Vec<String>,

    /// Paths to move out of LFS (glob, repeatable or comma-separated).
    ///
    /// Required. Each pattern also gets a `text -filter -merge -diff` line
    /// in the root .gitattributes of every rewritten commit.
    #[arg(short = 'I', long, value_name = "PATTERN", value_delimiter = ',')]
    include: Vec<String>,

    /// Paths to leave in LFS (glob, repeatable or comma-separated).
    #[arg(short = 'X', long, value_name = "PATTERN", value_delimiter = ',')]
    exclude: Vec<String>,

    /// Additional ref or revision to rewrite.
    #[arg(long = "include-ref", value_name = "REF")]
    include_ref: Vec<String>,

    /// Ref or revision whose history is left alone.
    #[arg(long = "exclude-ref", value_name = "REF")]
    exclude_ref: Vec<String>,

    /// Rewrite every local branch and tag.
    #[arg(long, conflicts_with_all = ["refs", "include_ref"])]
    everything: bool,

    /// Remote whose refs are excluded when no refs are given
    /// (default: `[migrate] remote` or "origin").
    #[arg(long, value_name = "NAME")]
    remote: Option<String>,

    /// Write an `<old>,<new>` line for every rewritten commit to this file.
    #[arg(long = "object-map", value_name = "PATH")]
    object_map: Option<PathBuf>,

    /// List every rewritten path, per commit.
    #[arg(short, long)]
    verbose: bool,

    /// Run as if started in DIR.
    #[arg(short = 'C', value_name = "DIR", default_value = ".")]
    directory: PathBuf,
}

/// Rewrite history so the selected LFS files become regular git blobs.
///
/// 1. Opens the repository and loads `.unlfs.toml`.
/// 2. Merges flags over config (LFS storage, remote, verbosity).
/// 3. Runs the export and reports what moved.
#[instrument(skip(args), fields(dir = %args.directory.display()))]
pub fn run(args: ExportArgs) -> Result<()> {
    if args.include.is_empty() {
        bail!(unlfs::error::ExportError::NoIncludePatterns);
    }

    let repo = GixRepo::open(&args.directory)
        .with_context(|| format!("not a git repository: {}", args.directory.display()))?;
    let config = UnlfsConfig::for_repo(&repo)?;
    let lfs = config
        .lfs_config(&repo)
        .context("could not determine the LFS storage directory")?;

    let request = ExportRequest {
        include: args.include,
        exclude: args.exclude,
        refs: RefSelection {
            include: args.refs.into_iter().chain(args.include_ref).collect(),
            exclude: args.exclude_ref,
            everything: args.everything,
            remote: args.remote.unwrap_or(config.migrate.remote),
        },
        lfs,
        object_map: args.object_map,
        verbose: args.verbose || config.migrate.verbose,
    };

    let outcome = run_export(&repo, &request)?;

    for r in &outcome.rewrite.updated_refs {
        let (old, new) = (r.old.to_string(), r.new.to_string());
        println!("  {}: {} -> {}", r.name, short(&old), short(&new));
    }
    println!(
        "Exported {} of {} commit(s) in {}.",
        outcome.rewrite.changed(),
        outcome.rewrite.commits.len(),
        repo.workdir().unwrap_or_else(|| repo.git_dir()).display()
    );
    Ok(())
}

fn short(oid: &str) -> &str {
    oid.get(..12).unwrap_or(oid)
}
