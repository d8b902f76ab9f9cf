//! Git abstraction layer for unlfs.
//!
//! This crate defines the [`GitRepo`] trait, the single interface through
//! which the history rewriter and the export command read and write git
//! objects, refs and the working tree. Nothing outside this crate imports
//! gix directly.
//!
//! # Crate layout
//!
//! - [`repo`]: the [`GitRepo`] trait definition.
//! - [`types`]: value types used in trait signatures ([`GitOid`], [`RefName`],
//!   [`TreeEntry`], [`RawObject`], etc.).
//! - [`error`]: the [`GitError`] enum returned by all trait methods.

pub mod error;
pub mod repo;
pub mod types;

// gix-backed implementation modules
mod checkout_impl;
mod config_impl;
mod gix_repo;
mod objects_impl;
mod refs_impl;

pub use gix_repo::GixRepo;

pub use error::GitError;
pub use repo::GitRepo;
pub use types::{
    CommitInfo, EntryMode, GitOid, ObjectKind, OidParseError, RawObject, RefEdit, RefName,
    RefNameError, TreeEntry,
};
