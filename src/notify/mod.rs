//! Output module for progress and results.
//!
//! This module handles:
//! - Colored console output
//! - Final report rendering
//! - JSON output persistence

pub mod console;
pub mod report;

pub use console::ConsoleOutput;
pub use report::ReportWriter;
