//! Shared test helpers for unlfs integration tests.
//!
//! All tests use temp directories, no side effects on the real repo. Each
//! test gets its own git repo via `setup_repo()`.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;
use unlfs::export::ExportRequest;
use unlfs::selection::RefSelection;
use unlfs_lfs::{LfsConfig, LfsStore, Pointer};

/// Run git in `dir` and return trimmed stdout. Panics on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        out.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8(out.stdout).unwrap().trim().to_owned()
}

/// Run git in `dir` and return raw stdout.
pub fn git_bytes(dir: &Path, args: &[&str]) -> Vec<u8> {
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        out.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    out.stdout
}

/// Create a fresh git repo on branch `main` in a temp directory.
pub fn setup_repo() -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    git(dir.path(), &["init", "-q", "-b", "main"]);
    git(dir.path(), &["config", "user.email", "test@test.com"]);
    git(dir.path(), &["config", "user.name", "Test User"]);
    git(dir.path(), &["config", "commit.gpgsign", "false"]);
    git(dir.path(), &["config", "tag.gpgsign", "false"]);
    dir
}

/// Write `files` (creating parent directories).
pub fn write_files<C: AsRef<[u8]>>(dir: &Path, files: &[(&str, C)]) {
    for (path, contents) in files {
        let full = dir.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, contents.as_ref()).unwrap();
    }
}

/// Stage everything, commit, and return the new HEAD.
pub fn commit_all(dir: &Path, message: &str) -> String {
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-q", "-m", message]);
    git(dir, &["rev-parse", "HEAD"])
}

/// The LFS store of the repository whose git dir is `git_dir`.
pub fn lfs_store(git_dir: &Path) -> LfsStore {
    LfsStore::new(&LfsConfig::for_git_dir(git_dir))
}

/// Put `content` in the repo's LFS store and write its pointer at `path`.
pub fn add_lfs_file(dir: &Path, path: &str, content: &[u8]) -> Pointer {
    let pointer = lfs_store(&dir.join(".git")).insert(content).unwrap();
    write_files(dir, &[(path, pointer.to_bytes())]);
    pointer
}

/// Content of `path` at `rev`.
pub fn show(dir: &Path, rev: &str, path: &str) -> Vec<u8> {
    git_bytes(dir, &["show", &format!("{rev}:{path}")])
}

pub fn show_str(dir: &Path, rev: &str, path: &str) -> String {
    String::from_utf8(show(dir, rev, path)).unwrap()
}

/// An export request for the repo at `dir` with default ref selection.
pub fn request(dir: &Path, include: &[&str], exclude: &[&str]) -> ExportRequest {
    ExportRequest {
        include: include.iter().map(|s| (*s).to_owned()).collect(),
        exclude: exclude.iter().map(|s| (*s).to_owned()).collect(),
        refs: RefSelection {
            remote: "origin".to_owned(),
            ..RefSelection::default()
        },
        lfs: LfsConfig::for_git_dir(&dir.join(".git")),
        object_map: None,
        verbose: false,
    }
}

/// Number of objects in the repository (loose and packed).
pub fn object_count(dir: &Path) -> usize {
    git(dir, &["count-objects", "-v"])
        .lines()
        .filter_map(|l| {
            l.strip_prefix("count: ")
                .or_else(|| l.strip_prefix("in-pack: "))
        })
        .map(|n| n.parse::<usize>().unwrap())
        .sum()
}

/// Run the unlfs binary in `dir`.
pub fn unlfs_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_unlfs"))
        .args(args)
        .current_dir(dir)
        .env_remove("UNLFS_LOG")
        .output()
        .expect("failed to execute unlfs")
}

/// Run unlfs and assert it succeeds. Returns stdout as string.
pub fn unlfs_ok(dir: &Path, args: &[&str]) -> String {
    let out = unlfs_in(dir, args);
    let stderr = String::from_utf8_lossy(&out.stderr);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        out.status.success(),
        "unlfs {} failed:\nstdout: {stdout}\nstderr: {stderr}",
        args.join(" "),
    );
    stdout.to_string()
}
