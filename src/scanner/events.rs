//! Scan lifecycle events.

use std::path::PathBuf;

use reelkeep_parser::VideoMetadata;

/// Events emitted over the scan engine's broadcast channel.
///
/// For a single scan the delivery order is: one `Started` per root,
/// `Progress`/`TaskCreated` pairs in file-visitation order, one `Error` per
/// unreachable root, and exactly one `Completed` as the final event.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// A root directory walk is beginning.
    Started { root: String },
    /// One file was parsed successfully.
    Progress { metadata: VideoMetadata },
    /// Follow-up enrichment work should be scheduled for this file.
    TaskCreated { metadata: VideoMetadata },
    /// A configured root could not be scanned.
    Error { root: PathBuf, message: String },
    /// The scan finished; carries every result accumulated across roots.
    Completed { results: Vec<VideoMetadata> },
}
