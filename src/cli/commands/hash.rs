//! Hash command - show cache keys without installing

use super::{resolve_project_dir, select_managers};
use crate::cli::args::HashArgs;
use crate::config::{Config, ConfigManager};
use crate::error::{DepcacheError, DepcacheResult};
use crate::manager::{ManagerConfig, RunContext};
use crate::orchestration::CacheOrchestrator;
use tracing::error;

/// Execute the hash command
///
/// Prints one line per manager: `<name> <fingerprint> <archive path> <cached|missing>`.
pub async fn execute(args: HashArgs, config: &Config) -> DepcacheResult<()> {
    let project_dir = resolve_project_dir(args.project.as_deref())?;
    let definitions = select_managers(&args.managers, &project_dir)?;

    let run_ctx = RunContext {
        project_dir,
        cache_root: ConfigManager::cache_root(config),
        force_refresh: false,
        extra_options: Vec::new(),
    };

    let orchestrator = CacheOrchestrator::new();
    let mut failed = 0;

    for def in definitions {
        let manager = ManagerConfig::from_definition(def, config.manager(def.name), &run_ctx);
        match orchestrator.plan(&manager).await {
            Ok(Some(plan)) => println!(
                "{} {} {} {}",
                def.name,
                plan.fingerprint,
                plan.archive_path.display(),
                if plan.cached { "cached" } else { "missing" }
            ),
            Ok(None) => {}
            Err(e) => {
                failed += 1;
                error!("{}: {}", def.name, e.describe());
            }
        }
    }

    if failed > 0 {
        return Err(DepcacheError::ManagersFailed(failed));
    }
    Ok(())
}
