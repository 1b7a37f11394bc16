//! Output helpers for consistent CLI output.
//!
//! Status messages with colored prefixes, following cargo-like patterns.
//!
//! ```rust,ignore
//! use emuctl::output::Output;
//!
//! Output::step("Install tpm2-abrmd.conf to /etc/dbus-1/system.d/tpm2-abrmd.conf");
//! Output::success("Installed 3 units");
//! Output::warning("Enable tpm2-abrmd.service failed");
//! ```

use owo_colors::OwoColorize;

/// Standard output helper for consistent CLI formatting.
pub struct Output;

impl Output {
    /// Print a success message with a green checkmark.
    ///
    /// Example: `✓ Installed 3 units`
    pub fn success(msg: impl AsRef<str>) {
        println!("{} {}", "✓".green().bold(), msg.as_ref());
    }

    /// Print a warning message with a yellow warning symbol to stderr.
    pub fn warning(msg: impl AsRef<str>) {
        eprintln!("{} {}", "⚠".yellow(), msg.as_ref());
    }

    /// Print a step message (for multi-step operations).
    pub fn step(msg: impl AsRef<str>) {
        println!("  {} {}", "•".cyan(), msg.as_ref());
    }

    /// Print a key-value pair with alignment.
    ///
    /// Example: `  Enabled:       enabled`
    pub fn kv(key: impl AsRef<str>, value: impl AsRef<str>) {
        println!("  {:<14} {}", format!("{}:", key.as_ref()).cyan(), value.as_ref());
    }

    /// Print a dry-run message.
    ///
    /// Example: `[dry-run] Would enable tpm2-abrmd.service`
    pub fn dry_run(msg: impl AsRef<str>) {
        println!("{} {}", "[dry-run]".dimmed(), msg.as_ref().dimmed());
    }
}

/// Render a program and its arguments as a shell-quoted command line.
pub fn command_line(program: &str, args: &[&str]) -> String {
    let mut parts = Vec::with_capacity(args.len() + 1);
    parts.push(program);
    parts.extend_from_slice(args);
    shlex::try_join(parts).unwrap_or_else(|_| format!("{} {}", program, args.join(" ")))
}
