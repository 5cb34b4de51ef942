// Pose Recorder 🚀 AGPL-3.0 License

//! CLI module for recording and comparing pose sequences.
//!
//! This module contains the command-line interface logic, including argument parsing,
//! console output, and the session runner behind the `record` and `compare` commands.

// Modules
/// CLI arguments.
pub mod args;

/// Console output macros and verbosity control.
pub mod logging;

/// Session runner.
pub mod run;
