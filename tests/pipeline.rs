//! End-to-end pipeline tests: scan a real directory tree, match the results
//! through a stub provider, and persist the catalog.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use reelkeep::catalog;
use reelkeep::matcher::MatchManager;
use reelkeep::metadata::{
    CachedProviderClient, MetadataProvider, ProviderCache, ProviderRegistry, SearchResult,
};
use reelkeep::scanner::{ScanConfig, ScanEngine, ScanEvent};
use reelkeep::workers::WorkerCoordinator;
use reelkeep_common::MatchStatus;
use reelkeep_db::pool::init_memory_pool;
use reelkeep_db::queries::items;
use tempfile::TempDir;

/// Provider that recognizes a fixed set of titles.
struct KnownTitlesProvider {
    known: Vec<(&'static str, u16)>,
}

#[async_trait]
impl MetadataProvider for KnownTitlesProvider {
    fn name(&self) -> &'static str {
        "known"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn search_movie(
        &self,
        title: &str,
        _year: Option<u16>,
    ) -> anyhow::Result<Vec<SearchResult>> {
        Ok(self
            .known
            .iter()
            .filter(|(known, _)| known.eq_ignore_ascii_case(title))
            .map(|(known, year)| SearchResult {
                id: format!("known-{year}"),
                title: known.to_string(),
                year: Some(*year),
                overview: None,
                confidence: 0.95,
                provider_name: "known".to_string(),
            })
            .collect())
    }

    async fn search_tv(
        &self,
        title: &str,
        _season: Option<u16>,
        _episode: Option<u16>,
    ) -> anyhow::Result<Vec<SearchResult>> {
        self.search_movie(title, None).await
    }
}

fn touch(dir: &Path, name: &str) {
    File::create(dir.join(name)).unwrap();
}

fn build_pipeline(
    known: Vec<(&'static str, u16)>,
) -> (
    reelkeep_db::pool::DbPool,
    Arc<ScanEngine>,
    Arc<MatchManager>,
    WorkerCoordinator,
) {
    let pool = init_memory_pool().unwrap();
    let engine = Arc::new(ScanEngine::new());
    let manager = Arc::new(MatchManager::new());

    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(KnownTitlesProvider { known }));
    let cache = ProviderCache::new(pool.clone(), chrono::Duration::hours(1));
    let client = Arc::new(CachedProviderClient::new(Arc::new(registry), cache));

    let coordinator = WorkerCoordinator::new(client, Arc::clone(&manager), 4, 0.7);
    (pool, engine, manager, coordinator)
}

#[tokio::test]
async fn scan_match_and_persist_full_run() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "Heat.1995.1080p.BluRay.x264.mkv");
    touch(dir.path(), "Totally.Unknown.Film.2019.mkv");
    fs::create_dir(dir.path().join("tv")).unwrap();
    touch(&dir.path().join("tv"), "Severance.S01E02.2160p.mkv");
    touch(dir.path(), "README.txt");

    let (pool, engine, manager, coordinator) =
        build_pipeline(vec![("Heat", 1995), ("Severance", 2022)]);

    let mut events = engine.subscribe();
    let config = ScanConfig::new(vec![dir.path().to_path_buf()]);

    coordinator
        .start_scan_worker(Arc::clone(&engine), config)
        .join()
        .await;

    let discovered = engine.get_results();
    assert_eq!(discovered.len(), 3);
    assert_eq!(manager.get_pending_count(), 3);

    // One Started, a Progress/TaskCreated pair per file, one Completed.
    let mut started = 0;
    let mut progress = 0;
    let mut tasks = 0;
    let mut completed = 0;
    while let Ok(event) = events.try_recv() {
        match event {
            ScanEvent::Started { .. } => started += 1,
            ScanEvent::Progress { .. } => progress += 1,
            ScanEvent::TaskCreated { .. } => tasks += 1,
            ScanEvent::Error { .. } => panic!("unexpected scan error"),
            ScanEvent::Completed { results } => {
                completed += 1;
                assert_eq!(results.len(), 3);
            }
        }
    }
    assert_eq!((started, progress, tasks, completed), (1, 3, 3, 1));

    coordinator.start_match_worker(discovered).join().await;
    assert_eq!(coordinator.get_active_count(), 0);

    assert_eq!(manager.get_matched_count(), 2);
    let unknown = manager
        .get_match(&dir.path().join("Totally.Unknown.Film.2019.mkv"))
        .unwrap();
    assert_eq!(unknown.status, MatchStatus::NoMatch);

    // Persist and read back.
    let conn = pool.get().unwrap();
    let library = catalog::get_or_create_library(&conn, "default", &[]).unwrap();
    let summary = catalog::persist_matches(&conn, &library, &manager.get_matches()).unwrap();
    assert_eq!(summary.written, 3);
    assert_eq!(summary.matched, 2);

    let heat = items::get_item_by_path(&conn, &dir.path().join("Heat.1995.1080p.BluRay.x264.mkv").display().to_string())
        .unwrap()
        .unwrap();
    assert_eq!(heat.title, "Heat");
    assert_eq!(heat.year, Some(1995));
    assert_eq!(heat.match_status, MatchStatus::Matched);
    assert_eq!(heat.provider_name.as_deref(), Some("known"));
}

#[tokio::test]
async fn missing_root_is_isolated_from_other_roots() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "Ran.1985.mkv");
    let missing = dir.path().join("gone");

    let (_pool, engine, manager, coordinator) = build_pipeline(vec![]);

    let mut events = engine.subscribe();
    let config = ScanConfig::new(vec![missing.clone(), dir.path().to_path_buf()]);
    coordinator
        .start_scan_worker(Arc::clone(&engine), config)
        .join()
        .await;

    assert_eq!(manager.len(), 1);

    let mut errors = 0;
    let mut completed_len = None;
    while let Ok(event) = events.try_recv() {
        match event {
            ScanEvent::Error { root, .. } => {
                errors += 1;
                assert_eq!(root, missing);
            }
            ScanEvent::Completed { results } => completed_len = Some(results.len()),
            _ => {}
        }
    }
    assert_eq!(errors, 1);
    assert_eq!(completed_len, Some(1));
    assert_eq!(coordinator.get_active_count(), 0);
}

#[tokio::test]
async fn cancelled_match_worker_cleans_up_count() {
    let dir = TempDir::new().unwrap();
    for i in 0..10 {
        touch(dir.path(), &format!("Film.Number.{i:02}.2001.mkv"));
    }

    let (_pool, engine, _manager, coordinator) = build_pipeline(vec![]);
    let config = ScanConfig::new(vec![dir.path().to_path_buf()]);
    coordinator
        .start_scan_worker(Arc::clone(&engine), config)
        .join()
        .await;

    let handle = coordinator.start_match_worker(engine.get_results());
    handle.cancel();
    handle.join().await;

    assert_eq!(coordinator.get_active_count(), 0);
}
