//! Rewrite engine behaviour with simple transforms.

mod common;

use std::cell::RefCell;
use std::collections::HashMap;

use common::{commit_all, git, setup_repo, show_str, write_files};
use unlfs::error::RewriteError;
use unlfs::filter::PathFilter;
use unlfs::rewrite::{
    Blob, ObjectTransform, ROOT, RewriteOptions, RewriteTip, Rewriter, Tree, commits_parents_first,
};
use unlfs_git::{GitError, GitOid, GitRepo, GixRepo, RefName};

#[derive(Debug)]
enum TestError {
    Rewrite(RewriteError),
    Git(GitError),
    Refused(String),
}

impl From<RewriteError> for TestError {
    fn from(e: RewriteError) -> Self {
        Self::Rewrite(e)
    }
}

impl From<GitError> for TestError {
    fn from(e: GitError) -> Self {
        Self::Git(e)
    }
}

/// Uppercases every blob and records each call.
#[derive(Default)]
struct Upcase {
    blob_calls: RefCell<HashMap<String, usize>>,
    tree_paths: RefCell<Vec<String>>,
    refuse: Option<&'static str>,
}

impl ObjectTransform for Upcase {
    type Error = TestError;

    fn blob(&self, path: &str, blob: Blob) -> Result<Blob, TestError> {
        if self.refuse == Some(path) {
            return Err(TestError::Refused(path.to_owned()));
        }
        *self.blob_calls.borrow_mut().entry(path.to_owned()).or_default() += 1;
        Ok(Blob::new(blob.as_bytes().to_ascii_uppercase()))
    }

    fn tree(&self, path: &str, tree: Tree) -> Result<Tree, TestError> {
        self.tree_paths.borrow_mut().push(path.to_owned());
        Ok(tree)
    }
}

fn head_tip(repo: &GixRepo) -> RewriteTip {
    let name = RefName::new("refs/heads/main").unwrap();
    RewriteTip {
        commit: repo.read_ref(&name).unwrap().unwrap(),
        name: Some(name),
    }
}

fn options(repo: &GixRepo, include: &[&str]) -> RewriteOptions {
    RewriteOptions {
        include: vec![head_tip(repo)],
        filter: PathFilter::new(include, Vec::<&str>::new()).unwrap(),
        update_refs: true,
        ..RewriteOptions::default()
    }
}

#[test]
fn unchanged_blobs_are_transformed_once() {
    let dir = setup_repo();
    write_files(dir.path(), &[("a.txt", "same\n"), ("dir/b.txt", "b\n")]);
    commit_all(dir.path(), "one");
    write_files(dir.path(), &[("c.md", "c\n")]);
    commit_all(dir.path(), "two");
    write_files(dir.path(), &[("dir/b.txt", "b2\n")]);
    commit_all(dir.path(), "three");
    let repo = GixRepo::open(dir.path()).unwrap();

    let transform = Upcase::default();
    let outcome = Rewriter::new(&repo)
        .rewrite(&options(&repo, &["*.txt"]), &transform)
        .unwrap();

    assert_eq!(outcome.commits.len(), 3);
    let calls = transform.blob_calls.borrow();
    assert_eq!(calls.get("a.txt"), Some(&1));
    assert_eq!(calls.get("dir/b.txt"), Some(&2));
    assert_eq!(calls.get("c.md"), None);
    assert_eq!(show_str(dir.path(), "main", "a.txt"), "SAME\n");
    assert_eq!(show_str(dir.path(), "main", "dir/b.txt"), "B2\n");
    assert_eq!(show_str(dir.path(), "main", "c.md"), "c\n");
    assert_eq!(show_str(dir.path(), "main~2", "dir/b.txt"), "B\n");
}

#[test]
fn tree_callback_sees_root_as_slash() {
    let dir = setup_repo();
    write_files(dir.path(), &[("a.txt", "a\n"), ("x/y/z.txt", "z\n")]);
    commit_all(dir.path(), "one");
    let repo = GixRepo::open(dir.path()).unwrap();

    let transform = Upcase::default();
    Rewriter::new(&repo)
        .rewrite(&options(&repo, &["*.txt"]), &transform)
        .unwrap();

    let mut paths = transform.tree_paths.borrow().clone();
    paths.sort();
    assert_eq!(paths, [ROOT, "x", "x/y"]);
}

#[test]
fn transform_error_leaves_refs_alone() {
    let dir = setup_repo();
    write_files(dir.path(), &[("a.txt", "a\n")]);
    commit_all(dir.path(), "one");
    write_files(dir.path(), &[("bad.txt", "b\n")]);
    let head = commit_all(dir.path(), "two");
    let repo = GixRepo::open(dir.path()).unwrap();

    let transform = Upcase {
        refuse: Some("bad.txt"),
        ..Upcase::default()
    };
    let err = Rewriter::new(&repo)
        .rewrite(&options(&repo, &["*.txt"]), &transform)
        .unwrap_err();

    assert!(matches!(err, TestError::Refused(ref p) if p == "bad.txt"));
    assert_eq!(git(dir.path(), &["rev-parse", "main"]), head);
}

#[test]
fn identity_rewrite_keeps_commit_ids() {
    let dir = setup_repo();
    write_files(dir.path(), &[("A.TXT", "ALREADY UPPER\n")]);
    let head = commit_all(dir.path(), "one");
    let repo = GixRepo::open(dir.path()).unwrap();

    let outcome = Rewriter::new(&repo)
        .rewrite(&options(&repo, &["*.TXT"]), &Upcase::default())
        .unwrap();

    assert_eq!(outcome.changed(), 0);
    assert!(outcome.updated_refs.is_empty());
    assert_eq!(git(dir.path(), &["rev-parse", "main"]), head);
}

#[test]
fn update_refs_false_only_computes() {
    let dir = setup_repo();
    write_files(dir.path(), &[("a.txt", "a\n")]);
    let head = commit_all(dir.path(), "one");
    let repo = GixRepo::open(dir.path()).unwrap();

    let mut opts = options(&repo, &["*.txt"]);
    opts.update_refs = false;
    let outcome = Rewriter::new(&repo).rewrite(&opts, &Upcase::default()).unwrap();

    let old: GitOid = head.parse().unwrap();
    let new = outcome.mapped(old).unwrap();
    assert_ne!(new, old);
    assert_eq!(git(dir.path(), &["rev-parse", "main"]), head);
    assert_eq!(show_str(dir.path(), &new.to_string(), "a.txt"), "A\n");
}

#[test]
fn merges_keep_parent_order() {
    let dir = setup_repo();
    write_files(dir.path(), &[("base.txt", "base\n")]);
    commit_all(dir.path(), "base");
    git(dir.path(), &["checkout", "-q", "-b", "side"]);
    write_files(dir.path(), &[("side.txt", "side\n")]);
    commit_all(dir.path(), "side");
    git(dir.path(), &["checkout", "-q", "main"]);
    write_files(dir.path(), &[("main.txt", "main\n")]);
    commit_all(dir.path(), "main");
    git(dir.path(), &["merge", "-q", "--no-edit", "side"]);
    let repo = GixRepo::open(dir.path()).unwrap();

    Rewriter::new(&repo)
        .rewrite(&options(&repo, &["*.txt"]), &Upcase::default())
        .unwrap();

    assert_eq!(show_str(dir.path(), "main^1", "main.txt"), "MAIN\n");
    assert_eq!(show_str(dir.path(), "main^2", "side.txt"), "SIDE\n");
    assert_eq!(git(dir.path(), &["rev-list", "--count", "main"]), "4");
    // `side` was not selected, so it still points at the old history.
    assert_eq!(show_str(dir.path(), "side", "side.txt"), "side\n");
}

#[test]
fn walk_orders_parents_first_and_honours_excludes() {
    let dir = setup_repo();
    write_files(dir.path(), &[("a", "1")]);
    let c1: GitOid = commit_all(dir.path(), "1").parse().unwrap();
    write_files(dir.path(), &[("a", "2")]);
    let c2: GitOid = commit_all(dir.path(), "2").parse().unwrap();
    write_files(dir.path(), &[("a", "3")]);
    let c3: GitOid = commit_all(dir.path(), "3").parse().unwrap();
    let repo = GixRepo::open(dir.path()).unwrap();

    assert_eq!(commits_parents_first(&repo, &[c3], &[]).unwrap(), [c1, c2, c3]);
    assert_eq!(commits_parents_first(&repo, &[c3], &[c1]).unwrap(), [c2, c3]);
    assert!(commits_parents_first(&repo, &[c2], &[c3]).unwrap().is_empty());
}
