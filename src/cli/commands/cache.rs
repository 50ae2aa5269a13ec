//! Cache command - manage cached archives

use crate::cache::{format_bytes, CacheEntry, CacheStore};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::{Config, ConfigManager};
use crate::error::DepcacheResult;
use crate::manager::registry;
use crate::ui::{self, UiContext};
use chrono::Utc;
use console::style;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> DepcacheResult<()> {
    let store = CacheStore::new(ConfigManager::cache_root(config));

    match args.action {
        CacheAction::List { format } => list_entries(&store, format).await,
        CacheAction::Clean { manager, yes } => {
            let ctx = UiContext::detect();
            clean(&ctx, &store, manager.as_deref(), yes).await
        }
        CacheAction::Gc { days, dry_run } => gc(&store, config, days, dry_run).await,
    }
}

/// List all archives
async fn list_entries(store: &CacheStore, format: OutputFormat) -> DepcacheResult<()> {
    let entries = store.entries().await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        _ if entries.is_empty() => {
            println!("No cache entries in {}.", store.root().display());
        }
        OutputFormat::Table => print_entry_table(&entries),
        OutputFormat::Plain => {
            for entry in &entries {
                println!("{}", entry.path.display());
            }
        }
    }

    Ok(())
}

fn print_entry_table(entries: &[CacheEntry]) {
    println!(
        "{:<10} {:<12} {:<16} {:>10} {:<20}",
        "MANAGER", "VERSION", "FINGERPRINT", "SIZE", "MODIFIED"
    );
    println!("{}", "-".repeat(72));

    let mut total = 0;
    for entry in entries {
        total += entry.size_bytes;
        println!(
            "{:<10} {:<12} {:<16} {:>10} {:<20}",
            entry.manager,
            entry.version,
            short_fingerprint(&entry.fingerprint),
            format_bytes(entry.size_bytes),
            entry.modified_at.format("%Y-%m-%d %H:%M")
        );
    }

    println!();
    println!(
        "Total: {} archive(s), {}",
        entries.len(),
        format_bytes(total)
    );
}

fn short_fingerprint(fingerprint: &str) -> &str {
    fingerprint.get(..12).unwrap_or(fingerprint)
}

/// Remove every archive, or one manager's archives
async fn clean(
    ctx: &UiContext,
    store: &CacheStore,
    manager: Option<&str>,
    skip_confirm: bool,
) -> DepcacheResult<()> {
    let target = match manager {
        Some(name) => {
            registry::find(name)?;
            store.manager_dir(name)?
        }
        None => store.root().to_path_buf(),
    };

    if !target.exists() {
        println!("Nothing to clean at {}.", target.display());
        return Ok(());
    }

    if !skip_confirm {
        if !ctx.is_interactive() {
            println!(
                "Not removing {} without confirmation; pass --yes.",
                target.display()
            );
            return Ok(());
        }
        if !ui::confirm(ctx, &format!("Remove {}?", target.display()), false).await? {
            println!("Aborted.");
            return Ok(());
        }
    }

    store.clear(manager).await?;
    println!("{} Removed {}", style("✓").green(), target.display());
    Ok(())
}

/// Remove archives older than the threshold
async fn gc(
    store: &CacheStore,
    config: &Config,
    days_override: Option<u32>,
    dry_run: bool,
) -> DepcacheResult<()> {
    let gc_days = days_override.unwrap_or(config.cache.gc_days);

    if gc_days == 0 {
        println!("Cache GC is disabled (gc_days = 0)");
        return Ok(());
    }

    let stale = store.gc(gc_days, dry_run).await?;
    let partials = store.gc_partials(gc_days, dry_run).await?;

    for path in &partials {
        println!("  {} {} (interrupted capture)", style("•").red(), path.display());
    }

    if stale.is_empty() && partials.is_empty() {
        println!("No archives older than {} days.", gc_days);
        return Ok(());
    }

    for entry in &stale {
        let age_days = (Utc::now() - entry.modified_at).num_days();
        println!(
            "  {} {}/{}/{} ({} days old, {})",
            style("•").red(),
            entry.manager,
            entry.version,
            short_fingerprint(&entry.fingerprint),
            age_days,
            format_bytes(entry.size_bytes)
        );
    }

    if dry_run {
        println!();
        println!("Dry run - no archives removed.");
    } else {
        println!(
            "{} removed {} archive(s), {} partial file(s)",
            style("✓").green(),
            stale.len(),
            partials.len()
        );
    }

    Ok(())
}
