//! Console UI helpers, adapted from this workspace's own installer `ui.rs`
//! — retargeted from GitOps-sync progress to registry-readiness and
//! node-injection progress.

use colored::Colorize;

/// Print the ksail banner.
pub fn print_banner() {
    println!();
    println!(
        "{}",
        r"
  _  __ _____       _ _
 | |/ // ____|     (_) |
 | ' /| (___   __ _ _| |
 |  <  \___ \ / _` | | |
 | . \ ____) | (_| | | |
 |_|\_\_____/ \__,_|_|_|
"
        .cyan()
    );
    println!(
        "  {}",
        "Local Kubernetes clusters with pull-through mirrors".bright_black()
    );
    println!();
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    println!("{}", "─".repeat(60).bright_black());
    println!("{}", title.cyan().bold());
    println!("{}", "─".repeat(60).bright_black());
    println!();
}

/// Print a step indicator with message.
pub fn print_step(message: &str) {
    println!("{} {}", "▶".cyan(), message.bold());
}

/// Print a progress step with step number, used for the bring-up
/// sequence's fixed seven steps.
pub fn print_progress_step(current: u8, total: u8, message: &str) {
    println!(
        "{} {} {}",
        format!("[{current}/{total}]").bright_black(),
        "▶".cyan(),
        message.bold()
    );
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message.yellow());
}

/// Print an error message.
pub fn print_error(message: &str) {
    println!("{} {}", "✗".red().bold(), message.red());
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print registry-readiness progress (how many of the pool have
/// responded to a TCP connect so far).
pub fn print_registry_progress(ready: usize, total: usize) {
    print_bar("registries ready", ready, total);
}

/// Print node-injection progress (how many `(node, host)` pairs have had
/// `hosts.toml` written so far).
pub fn print_injection_progress(done: usize, total: usize) {
    print_bar("mirrors injected", done, total);
}

fn print_bar(label: &str, done: usize, total: usize) {
    let pct = if total > 0 { (done * 100) / total } else { 100 };
    let bar_width = 30;
    let filled = (pct * bar_width) / 100;
    let empty = bar_width - filled;
    let bar = format!(
        "{}{}",
        "█".repeat(filled).green(),
        "░".repeat(empty).bright_black()
    );
    print!("\r  {} {label}: [{bar}] {done}/{total}", "⟳".cyan());
    use std::io::Write;
    let _ = std::io::stdout().flush();
    if done >= total {
        println!();
    }
}

/// Print a key-value pair.
pub fn print_kv(key: &str, value: &str) {
    println!("  {} {}", format!("{key}:").bright_black(), value.green());
}

/// Print a list item, e.g. one cluster name from `ksail list`.
pub fn print_list_item(item: &str) {
    println!("  {} {item}", "•".bright_black());
}
