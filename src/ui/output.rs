//! Line-oriented status output

use super::context::UiContext;
use console::{style, Emoji};

static CHECK: Emoji<'_, '_> = Emoji("✓ ", "[OK] ");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "[FAIL] ");
static WARN: Emoji<'_, '_> = Emoji("⚠ ", "[WARN] ");
static INFO: Emoji<'_, '_> = Emoji("• ", "[INFO] ");

/// Display a section header
pub fn section(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        println!("{}", style(title).bold().cyan());
    } else {
        println!("{}", title);
    }
}

/// Display a success step with detail
pub fn step_ok(ctx: &UiContext, name: &str, detail: &str) {
    if ctx.use_fancy_output() {
        println!("  {}{} {}", CHECK, style(name).green(), style(detail).dim());
    } else {
        println!("  {}{} {}", CHECK, name, detail);
    }
}

/// Display a warning step
pub fn step_warn(ctx: &UiContext, name: &str, detail: &str) {
    if ctx.use_fancy_output() {
        println!("  {}{} {}", WARN, style(name).yellow(), detail);
    } else {
        println!("  {}{} {}", WARN, name, detail);
    }
}

/// Display an error step; goes to stderr
pub fn step_error(ctx: &UiContext, name: &str, detail: &str) {
    if ctx.use_fancy_output() {
        eprintln!("  {}{}: {}", CROSS, style(name).red(), style(detail).red());
    } else {
        eprintln!("  {}{}: {}", CROSS, name, detail);
    }
}

/// Display an info step
pub fn step_info(ctx: &UiContext, name: &str, detail: &str) {
    if ctx.use_fancy_output() {
        println!("  {}{} {}", INFO, style(name).cyan(), style(detail).dim());
    } else {
        println!("  {}{} {}", INFO, name, detail);
    }
}
