//! CLI command handlers
//!
//! Handlers that only read the manifest and the filesystem; the build and
//! watch commands live in [`crate::build`].

pub mod compdb;
pub mod status;
