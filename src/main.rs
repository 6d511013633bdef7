mod cli;

use reelkeep::{catalog, config, matcher, metadata, scanner, workers};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use reelkeep_common::MatchStatus;
use reelkeep_db::pool::init_pool;
use reelkeep_db::queries::{history, provider_cache};
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "reelkeep=trace,reelkeep_parser=debug,reelkeep_db=debug,reelkeep_common=debug"
                .to_string()
        } else {
            "reelkeep=info,reelkeep_db=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Scan {
            roots,
            library,
            no_match,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_scan(cli.config.as_deref(), roots, &library, no_match))
        }
        Commands::Match { library } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_match(cli.config.as_deref(), &library))
        }
        Commands::Status { library } => show_status(cli.config.as_deref(), &library),
        Commands::SweepCache => sweep_cache(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate(path.as_deref())
        }
        Commands::Version => {
            println!("reelkeep {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run_scan(
    config_path: Option<&std::path::Path>,
    roots: Vec<PathBuf>,
    library_name: &str,
    no_match: bool,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let mut scan_config = config.scan_config();
    if !roots.is_empty() {
        scan_config.root_paths = roots;
    }
    if scan_config.root_paths.is_empty() {
        anyhow::bail!("No scan roots: pass directories or set [scan].roots in the config");
    }

    let db_path = config.database.path.to_string_lossy();
    tracing::info!("Initializing database at {}", db_path);
    let pool = init_pool(&db_path)?;

    // Discover
    let engine = Arc::new(scanner::ScanEngine::new());
    let (manager, coordinator) = build_matching(&pool, &config);

    coordinator
        .start_scan_worker(Arc::clone(&engine), scan_config.clone())
        .join()
        .await;

    let discovered = engine.get_results();
    println!("Discovered {} file(s)", discovered.len());

    // Match
    if !no_match && !discovered.is_empty() {
        coordinator.start_match_worker(discovered).join().await;
    }

    // Persist
    let conn = pool.get()?;
    let root_strings: Vec<String> = scan_config
        .root_paths
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    let library = catalog::get_or_create_library(&conn, library_name, &root_strings)?;

    let matches = manager.get_matches();
    let summary = catalog::persist_matches(&conn, &library, &matches)?;
    history::record_event(
        &conn,
        None,
        "scan_completed",
        Some(&format!("{} item(s) written", summary.written)),
    )?;

    println!(
        "Cataloged {} item(s): {} matched, {} pending, {} other",
        summary.written,
        summary.matched,
        summary.pending,
        summary.written - summary.matched - summary.pending,
    );

    Ok(())
}

fn build_matching(
    pool: &reelkeep_db::pool::DbPool,
    config: &config::Config,
) -> (Arc<matcher::MatchManager>, workers::WorkerCoordinator) {
    let manager = Arc::new(matcher::MatchManager::new());

    let mut registry = metadata::ProviderRegistry::new();
    registry.register(Arc::new(metadata::FilenameProvider));
    let cache = metadata::ProviderCache::new(
        pool.clone(),
        chrono::Duration::seconds(config.cache.ttl_secs),
    );
    let client = Arc::new(metadata::CachedProviderClient::new(
        Arc::new(registry),
        cache,
    ));

    let coordinator = workers::WorkerCoordinator::new(
        client,
        Arc::clone(&manager),
        config.matching.max_workers,
        config.matching.review_threshold,
    );
    (manager, coordinator)
}

async fn run_match(config_path: Option<&std::path::Path>, library_name: &str) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let pool = init_pool(&config.database.path.to_string_lossy())?;

    let unresolved: Vec<_> = {
        let conn = pool.get()?;
        let library =
            match reelkeep_db::queries::libraries::get_library_by_name(&conn, library_name)? {
                Some(library) => library,
                None => anyhow::bail!("No library named '{library_name}'. Run a scan first."),
            };

        reelkeep_db::queries::items::list_items(&conn, library.id)?
            .into_iter()
            .filter(|item| {
                matches!(
                    item.match_status,
                    MatchStatus::Pending | MatchStatus::NeedsReview
                ) && !item.user_confirmed
            })
            .map(|item| reelkeep_parser::VideoMetadata {
                path: PathBuf::from(&item.file_path),
                title: item.title,
                kind: item.media_kind,
                year: item.year,
                season: item.season_number,
                episode: item.episode_number,
                tokens: Vec::new(),
            })
            .collect()
    };

    if unresolved.is_empty() {
        println!("Nothing to match");
        return Ok(());
    }
    println!("Matching {} unresolved item(s)", unresolved.len());

    let (manager, coordinator) = build_matching(&pool, &config);
    manager.add_metadata(unresolved.clone());
    coordinator.start_match_worker(unresolved).join().await;

    let conn = pool.get()?;
    let library = catalog::get_or_create_library(&conn, library_name, &[])?;
    let summary = catalog::persist_matches(&conn, &library, &manager.get_matches())?;
    println!(
        "Updated {} item(s): {} matched",
        summary.written, summary.matched
    );

    Ok(())
}

fn show_status(config_path: Option<&std::path::Path>, library_name: &str) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let pool = init_pool(&config.database.path.to_string_lossy())?;
    let conn = pool.get()?;

    let library = match reelkeep_db::queries::libraries::get_library_by_name(&conn, library_name)?
    {
        Some(library) => library,
        None => {
            println!("No library named '{library_name}'. Run a scan first.");
            return Ok(());
        }
    };

    println!("Library: {} ({})", library.name, library.id);
    for status in [
        MatchStatus::Matched,
        MatchStatus::Pending,
        MatchStatus::NeedsReview,
        MatchStatus::NoMatch,
    ] {
        let count = reelkeep_db::queries::items::count_by_status(&conn, library.id, status)?;
        println!("  {status}: {count}");
    }

    let cached = provider_cache::count_entries(&conn)?;
    println!("Provider cache entries: {cached}");

    Ok(())
}

fn sweep_cache(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let pool = init_pool(&config.database.path.to_string_lossy())?;
    let conn = pool.get()?;

    let removed = provider_cache::sweep_expired(&conn, chrono::Utc::now())?;
    println!("Removed {removed} expired cache entries");

    Ok(())
}

fn validate(config_path: Option<&std::path::Path>) -> Result<()> {
    match config::load_config_or_default(config_path) {
        Ok(config) => {
            println!("Configuration is valid");
            println!("  database: {}", config.database.path.display());
            println!("  scan roots: {}", config.scan.roots.len());
            println!("  review threshold: {}", config.matching.review_threshold);
            println!("  max workers: {}", config.matching.max_workers);
            Ok(())
        }
        Err(e) => {
            eprintln!("Configuration is invalid: {e:#}");
            std::process::exit(1);
        }
    }
}
