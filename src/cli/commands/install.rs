//! Install command - restore or install dependencies for each manager

use super::{resolve_project_dir, select_managers};
use crate::cli::args::InstallArgs;
use crate::config::{Config, ConfigManager};
use crate::error::{DepcacheError, DepcacheResult};
use crate::manager::{ManagerConfig, RunContext};
use crate::orchestration::{CacheOrchestrator, Outcome};
use crate::ui::{self, TaskSpinner, UiContext};
use console::style;
use tracing::{debug, error};

/// Execute the install command
pub async fn execute(args: InstallArgs, config: &Config, verbose: u8) -> DepcacheResult<()> {
    let ctx = UiContext::detect();
    let spinner_ctx = spinner_context(ctx, verbose);
    let project_dir = resolve_project_dir(args.project.as_deref())?;
    debug!("Project directory: {}", project_dir.display());

    let definitions = select_managers(&args.managers, &project_dir)?;
    if definitions.is_empty() {
        println!(
            "No dependency manifests found in {}. Nothing to install.",
            project_dir.display()
        );
        return Ok(());
    }

    let run_ctx = RunContext {
        project_dir,
        cache_root: ConfigManager::cache_root(config),
        force_refresh: args.force_refresh || config.cache.force_refresh,
        extra_options: args.options,
    };
    debug!("Cache root: {}", run_ctx.cache_root.display());

    let orchestrator = CacheOrchestrator::new();
    let mut failed = 0;

    // Sequential on purpose: managers may share tooling and output
    for def in definitions {
        let manager = ManagerConfig::from_definition(def, config.manager(def.name), &run_ctx);
        let spinner = TaskSpinner::start(&spinner_ctx, &format!("{}: {}", def.name, manager.command_line()));
        let result = orchestrator.run(&manager).await;
        spinner.finish();

        match result {
            Ok(Outcome::Skipped) => ui::step_info(
                &ctx,
                def.name,
                &format!("no {} found, skipped", manager.manifest_path.display()),
            ),
            Ok(outcome) => ui::step_ok(&ctx, def.name, &outcome.to_string()),
            Err(e) => {
                failed += 1;
                error!("{}: {}", def.name, e.describe());
                ui::step_error(&ctx, def.name, "failed");
                if let Some(hint) = e.hint() {
                    eprintln!("    {} {}", style("Hint:").yellow(), hint);
                }
            }
        }
    }

    if failed > 0 {
        return Err(DepcacheError::ManagersFailed(failed));
    }
    Ok(())
}

/// Install output is logged to stderr with `-v`, where a live spinner
/// would draw over it
fn spinner_context(ctx: UiContext, verbose: u8) -> UiContext {
    if verbose > 0 {
        UiContext::non_interactive()
    } else {
        ctx
    }
}
