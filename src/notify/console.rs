//! Colored console output for scan progress.

use crate::types::{Registry, Verdict};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Console output handler with colors and formatting.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleOutput {
    verbose: bool,
    quiet: bool,
}

impl ConsoleOutput {
    /// Create a new console output handler.
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Print the start of a scan mode (file, directory, repository).
    pub fn print_analyzing(&self, kind: &str, path: &Path) {
        if self.quiet {
            return;
        }

        println!(
            "{} Analyzing {}: {}",
            "[*]".bright_blue(),
            kind,
            path.display().to_string().bright_white()
        );
    }

    /// Print a missing scan target.
    pub fn print_not_found(&self, kind: &str, path: &Path) {
        eprintln!(
            "{} {} not found: {}",
            "[-]".red(),
            capitalize(kind),
            path.display()
        );
    }

    /// Print a directory being walked in repository mode.
    pub fn print_searching(&self, dir: &Path) {
        if self.quiet {
            return;
        }

        println!("{} Searching in: {}", "[.]".blue(), dir.display());
    }

    /// Print a manifest picked up for scanning.
    pub fn print_manifest_found(&self, path: &Path) {
        if self.quiet {
            return;
        }

        println!("{} Found file: {}", "[+]".green(), path.display());
    }

    /// Print scan progress (only in verbose mode).
    pub fn print_progress(&self, message: &str) {
        if self.quiet || !self.verbose {
            return;
        }

        println!("{} {}", "[.]".dimmed(), message.dimmed());
    }

    /// Print the outcome of a single lookup.
    ///
    /// Vulnerable names are always shown. Inconclusive lookups are shown
    /// unless quiet, found names only in verbose mode.
    pub fn print_verdict(&self, name: &str, registry: Registry, verdict: &Verdict) {
        match verdict {
            Verdict::NotFound => {
                println!(
                    "{} Package {} not found in public {} registry! Possible for takeover.",
                    "[VULNERABLE]".red().bold(),
                    name.bright_white().bold(),
                    registry
                );
            }
            Verdict::Unpublished => {
                println!(
                    "{} Package {} has been unpublished from {} registry!",
                    "[VULNERABLE]".red().bold(),
                    name.bright_white().bold(),
                    registry
                );
            }
            Verdict::Unknown { status } if !self.quiet => {
                println!(
                    "{} Unexpected status code {} for {}.",
                    "[?]".yellow(),
                    status,
                    name
                );
            }
            Verdict::Error { error } if !self.quiet => {
                println!("{} Error checking {}: {}", "[!]".red(), name, error.dimmed());
            }
            Verdict::Found if self.verbose && !self.quiet => {
                println!(
                    "{} Package {} found in {} registry.",
                    "[.]".green(),
                    name,
                    registry
                );
            }
            _ => {}
        }
    }

    /// Create a progress bar for the lookups of one manifest.
    pub fn create_progress_bar(&self, total: u64, message: &str) -> Option<ProgressBar> {
        if self.quiet || self.verbose || total == 0 {
            return None;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_message(message.to_string());
        Some(pb)
    }

    /// Print the final result count.
    pub fn print_summary(&self, files_scanned: usize, vulnerability_count: usize) {
        println!();
        println!("{}", "=== Scan Summary ===".bright_cyan());
        println!("  Manifests: {}", files_scanned);

        if vulnerability_count > 0 {
            println!(
                "  {}",
                format!("POTENTIAL VULNERABILITIES FOUND: {}", vulnerability_count)
                    .red()
                    .bold()
            );
        } else {
            println!(
                "  {}",
                "No dependency confusion vulnerabilities found.".green()
            );
        }
        println!();
    }

    /// Print a saved report location.
    pub fn print_saved(&self, path: &Path) {
        if self.quiet {
            return;
        }

        println!("{} Results saved to {}", "[+]".green(), path.display());
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
