//! Terminal output helpers
//!
//! Results go to stdout; diagnostics go to stderr so that `--json` output
//! stays pipeable.

pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("⚠ {}", msg);
}

pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

/// Pad `text` to `width` columns
pub fn column(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}
