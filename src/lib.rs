//! Diskforge library exports.
//!
//! The binary in `main.rs` is a thin CLI over these modules; integration
//! tests exercise the same surface.

pub mod commands;
pub mod config;
pub mod image;
pub mod manifest;
pub mod plan;
pub mod process;
