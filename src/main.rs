//! Copier CLI - resumable file copy tool
//!
//! Usage: copier <COMMAND>
//!
//! Commands:
//!   copy    Copy a file or directory tree, resuming interrupted transfers
//!   diff    Show what a copy would do without writing
//!   watch   Mirror a directory continuously
//!   cache   Inspect or maintain the completed-file cache

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use copier::cache::CopyCache;
use copier::config::Config;
use copier::copy::{CopyEvent, CopyOptions, Copier, FileState};
use copier::ui::{detect_capabilities, format_size, ProgressBar};
use copier::watcher::{mirror, MirrorEvent, MirrorOptions};

/// Copier - resumable cross-platform file copy tool
#[derive(Parser, Debug)]
#[command(name = "copier")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output NDJSON events for CI
    #[arg(long, global = true, default_value = "false")]
    json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct CopyFlags {
    /// Probe block size in bytes for resume detection
    #[arg(long)]
    block_size: Option<u64>,

    /// Show what would be copied without writing
    #[arg(long)]
    dry_run: bool,

    /// Copy only files missing at the destination
    #[arg(long)]
    new_only: bool,

    /// Verify each file with SHA-256 after copying
    #[arg(long)]
    verify: bool,

    /// Skip the completed-file cache
    #[arg(long)]
    no_cache: bool,

    /// Use an alternate cache file
    #[arg(long)]
    cache_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy a file or directory tree, resuming interrupted transfers
    Copy {
        /// File or directory to copy
        source: PathBuf,

        /// Where it lands
        dest: PathBuf,

        #[command(flatten)]
        flags: CopyFlags,
    },

    /// Show what a copy would do without writing
    Diff {
        /// File or directory to compare
        source: PathBuf,

        /// Destination to compare against
        dest: PathBuf,

        /// Probe block size in bytes for resume detection
        #[arg(long)]
        block_size: Option<u64>,

        /// Use an alternate cache file
        #[arg(long)]
        cache_file: Option<PathBuf>,
    },

    /// Mirror a directory continuously
    Watch {
        /// Directory to watch
        source: PathBuf,

        /// Mirror destination
        dest: PathBuf,

        /// Probe block size in bytes for resume detection
        #[arg(long)]
        block_size: Option<u64>,

        /// Verify each file with SHA-256 after copying
        #[arg(long)]
        verify: bool,

        /// Skip the completed-file cache
        #[arg(long)]
        no_cache: bool,

        /// Use an alternate cache file
        #[arg(long)]
        cache_file: Option<PathBuf>,
    },

    /// Inspect or maintain the completed-file cache
    Cache {
        /// Drop entries older than the maximum age
        #[arg(long)]
        prune: bool,

        /// Remove every entry
        #[arg(long)]
        clear: bool,

        /// Use an alternate cache file
        #[arg(long)]
        cache_file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Copy { source, dest, flags } => {
            cmd_copy(&source, &dest, flags, cli.json, cli.verbose)
        }
        Commands::Diff {
            source,
            dest,
            block_size,
            cache_file,
        } => cmd_diff(&source, &dest, block_size, cache_file, cli.json),
        Commands::Watch {
            source,
            dest,
            block_size,
            verify,
            no_cache,
            cache_file,
        } => cmd_watch(&source, &dest, block_size, verify, no_cache, cache_file, cli.json),
        Commands::Cache {
            prune,
            clear,
            cache_file,
        } => cmd_cache(prune, clear, cache_file, cli.json),
    }
}

/// Load the user config, surfacing unknown-key warnings on stderr.
fn load_config(json: bool) -> Config {
    if let Some(config_dir) = dirs::config_dir() {
        let user_config = config_dir.join("copier/config.toml");
        if user_config.exists() {
            match Config::load_with_warnings(&user_config) {
                Ok((config, warnings)) => {
                    if !json {
                        for w in &warnings {
                            let line = w
                                .line
                                .map(|n| format!(":{}", n))
                                .unwrap_or_default();
                            match &w.suggestion {
                                Some(s) => eprintln!(
                                    "⚠ {}{}: unknown key `{}` (did you mean `{}`?)",
                                    w.file.display(),
                                    line,
                                    w.key,
                                    s
                                ),
                                None => eprintln!(
                                    "⚠ {}{}: unknown key `{}`",
                                    w.file.display(),
                                    line,
                                    w.key
                                ),
                            }
                        }
                    }
                    return config.with_env_overrides();
                }
                Err(e) => {
                    if !json {
                        eprintln!("⚠ Ignoring invalid config: {}", e);
                    }
                }
            }
        }
    }

    Config::default().with_env_overrides()
}

fn resolve_cache_file(config: &Config, flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(|| config.cache_file())
}

fn cmd_copy(
    source: &PathBuf,
    dest: &PathBuf,
    flags: CopyFlags,
    json: bool,
    verbose: u8,
) -> Result<()> {
    let config = load_config(json);

    let mut options = CopyOptions::from_config(&config);
    if let Some(size) = flags.block_size {
        if size == 0 {
            anyhow::bail!("--block-size must be at least 1 byte");
        }
        options.block_size = size;
    }
    options.dry_run = flags.dry_run;
    options.new_only = flags.new_only;
    options.verify = options.verify || flags.verify;
    if flags.no_cache {
        options.use_cache = false;
    }

    let cache_path = resolve_cache_file(&config, flags.cache_file);
    let cache = CopyCache::load(cache_path).with_max_age_weeks(config.cache.max_age_weeks);

    let abort = Arc::new(AtomicBool::new(false));
    let abort_handler = abort.clone();
    ctrlc::set_handler(move || {
        abort_handler.store(true, Ordering::SeqCst);
    })?;

    let mut copier = Copier::new(options, cache).with_abort_flag(abort);

    if !json {
        println!("📦 Copier");
        println!("Source: {}", source.display());
        println!("Dest:   {}", dest.display());
        if flags.dry_run {
            println!("Mode: Dry run");
        }
        if flags.new_only {
            println!("Mode: New files only");
        }
        println!();
    }

    let caps = detect_capabilities();
    let mut progress_active = false;

    let result = copier.copy_path(source, dest, &mut |event| {
        if json {
            println!("{}", event.to_json());
            return;
        }

        match event {
            CopyEvent::FileStarted {
                path,
                resume_offset,
                total_size,
            } => {
                if resume_offset > 0 {
                    let pct = if total_size == 0 {
                        0
                    } else {
                        resume_offset * 100 / total_size
                    };
                    println!(
                        "⏯ Resuming {} at {} ({}%)",
                        path,
                        format_size(resume_offset),
                        pct
                    );
                } else if verbose > 0 {
                    println!("📄 Copying {}", path);
                }
            }
            CopyEvent::Progress {
                path,
                percent,
                copied,
                total,
                rate_mbps,
                eta_secs,
            } => {
                let mut bar = ProgressBar::with_message(total, short_name(&path));
                bar.set(copied);
                bar.set_rate(rate_mbps);
                bar.set_eta(eta_secs.map(std::time::Duration::from_secs));
                if caps.is_tty {
                    let line = bar.render(caps.supports_unicode);
                    let width = caps.width as usize;
                    print!("\r{:<width$}", line, width = width);
                    let _ = std::io::stdout().flush();
                    progress_active = true;
                } else if verbose > 0 && percent % 10 == 0 {
                    // Piped output gets a coarse line every 10% instead of a
                    // redrawn bar.
                    println!("{}", bar.render(false));
                }
            }
            CopyEvent::FileCopied { path, bytes_copied } => {
                if progress_active {
                    let width = caps.width as usize;
                    print!("\r{:<width$}\r", "", width = width);
                    progress_active = false;
                }
                println!("✓ {} ({})", path, format_size(bytes_copied));
            }
            CopyEvent::FileCached { path } => {
                if verbose > 0 {
                    println!("⏭ Cached: {}", path);
                }
            }
            CopyEvent::FileComplete { path } => {
                if verbose > 0 {
                    println!("⏭ Already complete: {}", path);
                }
            }
            CopyEvent::FileError { path, message } => {
                if progress_active {
                    println!();
                    progress_active = false;
                }
                eprintln!("✗ {}: {}", path, message);
            }
            CopyEvent::Aborted => {
                if progress_active {
                    println!();
                    progress_active = false;
                }
                println!("\n✋ Interrupted");
            }
            CopyEvent::PassStarted { .. } => {}
        }
    })?;

    if copier.options().use_cache && !flags.dry_run {
        copier.cache_mut().save()?;
    }

    if json {
        let output = serde_json::json!({
            "event": "summary",
            "status": if result.aborted {
                "aborted"
            } else if result.is_success() {
                "success"
            } else {
                "partial"
            },
            "copied": result.copied.len(),
            "cached": result.cached.len(),
            "errors": result.errors.len(),
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("\n📊 Copy Results:");
        println!("  ✓ Copied: {} files", result.copied.len());
        if !result.cached.is_empty() {
            println!("  ⏭ Skipped: {} files (already done)", result.cached.len());
        }
        if !result.errors.is_empty() {
            println!("  ✗ Errors: {}", result.errors.len());
            for err in &result.errors {
                println!("    - {}", err);
            }
        }
        println!();
    }

    if result.aborted || !result.is_success() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_diff(
    source: &PathBuf,
    dest: &PathBuf,
    block_size: Option<u64>,
    cache_file: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = load_config(json);

    let mut options = CopyOptions::from_config(&config);
    if let Some(size) = block_size {
        if size == 0 {
            anyhow::bail!("--block-size must be at least 1 byte");
        }
        options.block_size = size;
    }

    let cache_path = resolve_cache_file(&config, cache_file);
    let cache = CopyCache::load(cache_path);
    let copier = Copier::new(options, cache);

    if !json {
        println!("📊 Copier Diff");
        println!("Source: {}", source.display());
        println!("Dest:   {}", dest.display());
        println!();
    }

    let mut new_files = Vec::new();
    let mut incomplete_files = Vec::new();
    let mut complete_files = Vec::new();
    let mut cached_files = Vec::new();

    let pairs = diff_pairs(source, dest)?;
    for (src_path, dest_path, label) in &pairs {
        let state = copier.inspect_file(src_path, dest_path)?;

        if json {
            let output = serde_json::json!({
                "event": "file",
                "path": label,
                "state": state_name(state),
                "percent_done": state.percent_done(),
            });
            println!("{}", serde_json::to_string(&output)?);
        }

        match state {
            FileState::New => new_files.push(label.clone()),
            FileState::Incomplete { offset, total } => {
                incomplete_files.push((label.clone(), offset, total))
            }
            FileState::Complete => complete_files.push(label.clone()),
            FileState::Cached => cached_files.push(label.clone()),
        }
    }

    if json {
        let output = serde_json::json!({
            "event": "diff",
            "new": new_files.len(),
            "incomplete": incomplete_files.len(),
            "complete": complete_files.len(),
            "cached": cached_files.len(),
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        if !new_files.is_empty() {
            println!("📁 New files ({}):", new_files.len());
            for path in &new_files {
                println!("  + {}", path);
            }
            println!();
        }

        if !incomplete_files.is_empty() {
            println!("⏯ Partial files ({}):", incomplete_files.len());
            for (path, offset, total) in &incomplete_files {
                println!(
                    "  ~ {} ({} of {})",
                    path,
                    format_size(*offset),
                    format_size(*total)
                );
            }
            println!();
        }

        println!(
            "Summary: {} new, {} partial, {} complete, {} cached",
            new_files.len(),
            incomplete_files.len(),
            complete_files.len(),
            cached_files.len()
        );
    }

    Ok(())
}

/// Enumerate (source, dest, label) file pairs for a diff. A file source
/// yields one pair; a directory source yields one per file in the tree.
fn diff_pairs(
    source: &PathBuf,
    dest: &PathBuf,
) -> Result<Vec<(PathBuf, PathBuf, String)>> {
    let mut pairs = Vec::new();

    if source.is_file() {
        let dest_path = if dest.is_dir() {
            match source.file_name() {
                Some(name) => dest.join(name),
                None => dest.clone(),
            }
        } else {
            dest.clone()
        };
        pairs.push((source.clone(), dest_path, source.display().to_string()));
        return Ok(pairs);
    }

    if !source.is_dir() {
        anyhow::bail!("source not found: {}", source.display());
    }

    let walk = ignore::WalkBuilder::new(source)
        .standard_filters(false)
        .follow_links(false)
        .build();

    for entry in walk {
        let entry = entry?;
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let rel = match entry.path().strip_prefix(source) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => continue,
        };
        let label = rel.display().to_string();
        pairs.push((entry.path().to_path_buf(), dest.join(&rel), label));
    }

    pairs.sort_by(|a, b| a.2.cmp(&b.2));
    Ok(pairs)
}

fn state_name(state: FileState) -> &'static str {
    match state {
        FileState::New => "new",
        FileState::Incomplete { .. } => "incomplete",
        FileState::Complete => "complete",
        FileState::Cached => "cached",
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_watch(
    source: &PathBuf,
    dest: &PathBuf,
    block_size: Option<u64>,
    verify: bool,
    no_cache: bool,
    cache_file: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = load_config(json);

    let mut copy_options = CopyOptions::from_config(&config);
    if let Some(size) = block_size {
        if size == 0 {
            anyhow::bail!("--block-size must be at least 1 byte");
        }
        copy_options.block_size = size;
    }
    copy_options.verify = copy_options.verify || verify;
    if no_cache {
        copy_options.use_cache = false;
    }

    let options = MirrorOptions {
        source: source.clone(),
        dest: dest.clone(),
        copy: copy_options,
        cache_file: resolve_cache_file(&config, cache_file),
        json,
    };

    let abort = Arc::new(AtomicBool::new(false));
    let abort_handler = abort.clone();
    ctrlc::set_handler(move || {
        abort_handler.store(true, Ordering::SeqCst);
    })?;

    if !json {
        println!("👀 Copier Watch");
        println!("Source: {}", source.display());
        println!("Dest:   {}", dest.display());
        println!("Press Ctrl+C to stop\n");
    }

    mirror(options, abort, |event| {
        if json {
            println!("{}", event.to_json());
        } else {
            match event {
                MirrorEvent::MirrorStarted { source, dest } => {
                    println!("📂 Mirroring: {} → {}", source, dest);
                }
                MirrorEvent::FileChanged { path } => {
                    println!("📝 Changed: {}", path);
                }
                MirrorEvent::CopyStarted => {
                    println!("🔄 Copying...");
                }
                MirrorEvent::CopyComplete {
                    copied,
                    cached,
                    errors,
                } => {
                    if errors > 0 {
                        println!(
                            "⚠ Copy: {} copied, {} skipped, {} errors",
                            copied, cached, errors
                        );
                    } else {
                        println!("✓ Copy: {} copied, {} skipped", copied, cached);
                    }
                }
                MirrorEvent::Error { message } => {
                    eprintln!("✗ Error: {}", message);
                }
                MirrorEvent::Shutdown => {
                    println!("\n👋 Shutting down...");
                }
            }
        }
    })?;

    Ok(())
}

fn cmd_cache(prune: bool, clear: bool, cache_file: Option<PathBuf>, json: bool) -> Result<()> {
    let config = load_config(json);
    let cache_path = resolve_cache_file(&config, cache_file);
    let mut cache =
        CopyCache::load(cache_path.clone()).with_max_age_weeks(config.cache.max_age_weeks);

    let mut removed = 0usize;
    if clear {
        removed = cache.len();
        cache.clear();
        cache.save()?;
    } else if prune {
        removed = cache.prune();
        cache.save()?;
    }

    if json {
        let output = serde_json::json!({
            "event": "cache",
            "file": cache_path.display().to_string(),
            "entries": cache.len(),
            "removed": removed,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("🗃 Copier Cache");
        println!("File: {}", cache_path.display());
        println!("Entries: {}", cache.len());
        if clear {
            println!("Cleared {} entries", removed);
        } else if prune {
            println!("Pruned {} expired entries", removed);
        }
    }

    Ok(())
}

/// Final path component for progress display; full paths overflow the line.
fn short_name(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
