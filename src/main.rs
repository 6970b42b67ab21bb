mod cli;
mod logging;
mod reporter;
mod utils;

use std::path::Path;
use std::process;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, PruneArgs, ScanArgs};
use colored::*;
use dotenv::dotenv;
use reporter::CliReporter;
use title_duper::config::{self, AppConfig};
use title_duper::{deletion, report, server, Group, ScanEngine, ScanResult};
use tracing::{error, info, warn};

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Scan(args)) => {
            if let Err(err) = run_scan(config, &args) {
                error!("Error: {:#}", err);
                process::exit(1);
            }
        }
        Some(Commands::Prune(args)) => {
            if let Err(err) = run_prune(config, &args) {
                error!("Error: {:#}", err);
                process::exit(1);
            }
        }
        Some(Commands::Serve { bind }) => {
            let mut config = config;
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            runtime.block_on(server::serve(config))?;
        }
        Some(Commands::SetStopwords { stopwords }) => {
            let saved =
                config::save_stopwords(Path::new(&config.preferences_path), &stopwords)?;
            println!("Saved stopwords: {}", saved.join(","));
        }
        Some(Commands::SetDefaultPath { path }) => {
            let saved = config::save_default_path(Path::new(&config.preferences_path), &path)?;
            println!("Saved default path: {}", saved.display());
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn run_engine(mut config: AppConfig, args: &cli::AnalysisArgs) -> anyhow::Result<ScanResult> {
    let folder = args.apply(&mut config);
    let engine = ScanEngine::new(&config)?;
    let reporter = CliReporter::new();
    let result = engine
        .scan(&folder, &reporter)
        .with_context(|| format!("scan of {} failed", folder.display()))?;

    info!(
        "Collect: {}, Analyze: {}",
        format!("{:.2}s", result.collect_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.analyze_duration.as_secs_f64()).green(),
    );
    if result.skipped_untitled > 0 || result.skipped_unreadable > 0 {
        warn!(
            "Skipped {} untitled and {} unreadable entries",
            result.skipped_untitled, result.skipped_unreadable
        );
    }
    Ok(result)
}

fn run_scan(config: AppConfig, args: &ScanArgs) -> anyhow::Result<()> {
    let result = run_engine(config, &args.analysis)?;
    let analysis = &result.analysis;

    println!();
    for (i, group) in analysis.groups.iter().enumerate() {
        print_group(i + 1, group);
    }
    info!(
        "{} files, {} groups, {} files in groups",
        format!("{}", analysis.total_files).cyan(),
        format!("{}", analysis.group_count).red(),
        format!("{}", analysis.duplicate_file_count).red(),
    );

    if let Some(path) = &args.json {
        report::write_json(analysis, path)?;
    }
    if let Some(path) = &args.csv {
        report::write_csv(analysis, path)?;
    }
    Ok(())
}

fn print_group(index: usize, group: &Group) {
    println!(
        "{} {} ({} files)",
        format!("Group {}:", index).bold(),
        group.representative.yellow(),
        group.size
    );
    if !group.shared_snippets.is_empty() {
        println!("   shared: {}", group.shared_snippets.join(" | ").dimmed());
    }
    println!("   hits:   {}", group.length_stats_text.dimmed());
    for f in &group.files {
        let marker = if f.is_latest_by_size {
            "★".green()
        } else {
            "·".normal()
        };
        println!(
            "   {} {}  {}  {}",
            marker,
            f.name,
            f.size_text.cyan(),
            f.modified.dimmed()
        );
    }
    println!();
}

fn run_prune(config: AppConfig, args: &PruneArgs) -> anyhow::Result<()> {
    let result = run_engine(config, &args.analysis)?;
    let stale = deletion::stale_copies(&result.analysis);
    if stale.is_empty() {
        println!("No smaller copies to prune.");
        return Ok(());
    }

    for group in &result.analysis.groups {
        for f in group.latest_files() {
            println!("   🏆 Keeping → {}", f.path);
        }
        for f in group.stale_files() {
            println!("   🗑️  {} {} ({})", "Delete".red(), f.path, f.size_text);
        }
    }

    if args.dry_run {
        println!("\n⚠️  Dry-run only; no files were changed.");
        return Ok(());
    }

    let prompt = format!("Delete {} file(s)?", stale.len());
    if !args.yes && !utils::prompt_confirm(&prompt, Some(false))? {
        println!("Aborted.");
        return Ok(());
    }

    let outcome = deletion::delete_files(&stale, &result.folder);
    println!(
        "\n✅ Deleted {} file(s), {} failed",
        format!("{}", outcome.deleted_count).green(),
        format!("{}", outcome.failed_count).red(),
    );
    for failure in &outcome.failed {
        println!("   ⚠️  {}: {}", failure.path, failure.reason);
    }
    println!("Run `title-duper scan` again to see the updated groups.");
    Ok(())
}
