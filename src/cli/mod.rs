//! CLI interface for the ELAG compiler
//!
//! Provides command-line utilities for compiling rules and filtering text
//! automata.

pub mod args;
pub mod commands;
pub mod detect;
pub mod paths;

pub use args::{AutomatonFormat, Cli, Commands, ConfigAction};
pub use detect::{detect_format, DetectionMethod, FormatDetection};
pub use paths::{config_dir, PersistentConfig};
