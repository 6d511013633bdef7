//! Media library scanner.
//!
//! Walks configured root directories, parses every matching video filename
//! into [`VideoMetadata`], and publishes lifecycle events over a broadcast
//! channel so the coordinator and any observers can react as files are
//! discovered.

pub mod events;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use reelkeep_common::paths::is_video_extension;
use reelkeep_parser::VideoMetadata;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub use events::ScanEvent;

/// Callback invoked synchronously with each parsed file's metadata.
pub type EnrichmentCallback = Box<dyn Fn(&VideoMetadata) + Send + Sync>;

/// Input to one scan run. Immutable for the duration of the scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directories to walk recursively.
    pub root_paths: Vec<PathBuf>,
    /// Extensions to accept (lowercase, no dot). Empty means the built-in
    /// video extension list.
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Substring the file name must contain, if set.
    #[serde(default)]
    pub name_contains: Option<String>,
    /// Whether the walk follows symlinks.
    #[serde(default)]
    pub follow_links: bool,
}

impl ScanConfig {
    pub fn new(root_paths: Vec<PathBuf>) -> Self {
        Self {
            root_paths,
            extensions: Vec::new(),
            name_contains: None,
            follow_links: false,
        }
    }

    fn matches(&self, path: &Path) -> bool {
        let accepted_extension = if self.extensions.is_empty() {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| is_video_extension(&e.to_lowercase()))
                .unwrap_or(false)
        } else {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
                .unwrap_or(false)
        };
        if !accepted_extension {
            return false;
        }

        match &self.name_contains {
            Some(needle) => path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
            None => true,
        }
    }
}

/// Scanner for discovering video files and parsing their names.
pub struct ScanEngine {
    events: broadcast::Sender<ScanEvent>,
    results: RwLock<Vec<VideoMetadata>>,
    callbacks: RwLock<Vec<Arc<EnrichmentCallback>>>,
}

impl ScanEngine {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            events,
            results: RwLock::new(Vec::new()),
            callbacks: RwLock::new(Vec::new()),
        }
    }

    /// Subscribe to scan lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.events.subscribe()
    }

    /// Register a callback invoked synchronously for every parsed file, in
    /// registration order, for this and all future scans.
    pub fn add_enrichment_callback(&self, callback: EnrichmentCallback) {
        self.callbacks.write().push(Arc::new(callback));
    }

    /// Walk every configured root and parse matching files.
    ///
    /// A root that does not exist produces one `Error` event and contributes
    /// nothing; remaining roots are still scanned. The returned sequence is
    /// also retained internally and carried by the final `Completed` event.
    pub fn scan(&self, config: &ScanConfig) -> Vec<VideoMetadata> {
        self.scan_with_cancel(config, &CancellationToken::new())
    }

    /// Like [`scan`](Self::scan), but stops visiting new entries once the
    /// token is cancelled. Events already due (including `Completed`) are
    /// still emitted with whatever was accumulated.
    pub fn scan_with_cancel(
        &self,
        config: &ScanConfig,
        cancel: &CancellationToken,
    ) -> Vec<VideoMetadata> {
        let mut results = Vec::new();

        'roots: for root in &config.root_paths {
            if cancel.is_cancelled() {
                break;
            }
            if !root.exists() {
                warn!("Scan root does not exist: {:?}", root);
                self.emit(ScanEvent::Error {
                    root: root.clone(),
                    message: "root path does not exist".to_string(),
                });
                continue;
            }

            info!("Scanning directory: {:?}", root);
            self.emit(ScanEvent::Started {
                root: root.display().to_string(),
            });

            for entry in WalkDir::new(root)
                .follow_links(config.follow_links)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if cancel.is_cancelled() {
                    break 'roots;
                }

                let path = entry.path();
                if path.is_dir() || !config.matches(path) {
                    continue;
                }

                let metadata = match reelkeep_parser::parse(path) {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        debug!("Skipping unparseable file {:?}: {}", path, e);
                        continue;
                    }
                };

                self.emit(ScanEvent::Progress {
                    metadata: metadata.clone(),
                });

                for callback in self.callbacks.read().iter() {
                    callback(&metadata);
                }

                self.emit(ScanEvent::TaskCreated {
                    metadata: metadata.clone(),
                });

                results.push(metadata);
            }
        }

        *self.results.write() = results.clone();
        self.emit(ScanEvent::Completed {
            results: results.clone(),
        });

        results
    }

    /// Copy of the most recent scan's results.
    pub fn get_results(&self) -> Vec<VideoMetadata> {
        self.results.read().clone()
    }

    /// Retained results whose path exactly matches one of the requested
    /// paths.
    pub fn get_results_by_paths(&self, paths: &[PathBuf]) -> Vec<VideoMetadata> {
        self.results
            .read()
            .iter()
            .filter(|m| paths.iter().any(|p| p == &m.path))
            .cloned()
            .collect()
    }

    /// Drop the retained results from the last scan.
    pub fn clear_results(&self) {
        self.results.write().clear();
    }

    fn emit(&self, event: ScanEvent) {
        // No receivers is fine; events are best-effort notifications.
        let _ = self.events.send(event);
    }
}

impl Default for ScanEngine {
    fn default() -> Self {
        Self::new()
    }
}
