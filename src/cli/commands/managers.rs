//! Managers command - list supported package managers

use crate::error::DepcacheResult;
use crate::install::command_line;
use crate::manager::{registry, PathResolver, ToolResolver};
use crate::ui::{self, UiContext};

/// Execute the managers command
pub async fn execute() -> DepcacheResult<()> {
    let ctx = UiContext::detect();
    ui::section(&ctx, "Supported package managers:");

    for def in registry::all() {
        let detail = format!(
            "{} -> {} ({})",
            def.manifest,
            def.install_directory,
            command_line(def.install_command, def.install_options)
        );
        match PathResolver.resolve(def.name) {
            Some(path) => ui::step_ok(&ctx, def.name, &format!("{} [{}]", detail, path.display())),
            None => ui::step_warn(&ctx, def.name, &format!("{} [not on PATH]", detail)),
        }
    }

    Ok(())
}
