//! # kiln - watch-driven incremental builds
//!
//! kiln keeps a C/C++ tree built while you edit it. On every relevant file
//! change it recompiles the units whose objects are older than their sources,
//! re-archives the affected static libraries, relinks the executable and
//! packages it with its resources.
//!
//! ## Quick Start
//!
//! ```bash
//! # Build once, then rebuild on every change
//! kiln watch
//!
//! # One pass, non-zero exit on failure
//! kiln build
//! ```
//!
//! ## Module Organization
//!
//! - [`build`] - Staleness checks, stages, pass coordinator and watch loop
//! - [`config`] - Manifest parsing (`kiln.toml`)
//! - [`commands`] - Read-only CLI command handlers

/// Incremental pipeline and watch controller.
pub mod build;

/// Read-only CLI command handlers.
pub mod commands;

/// Manifest (`kiln.toml`) model.
pub mod config;

/// Terminal UI utilities (tables).
pub mod ui;

#[cfg(test)]
mod testutil;
