//! Drafts watcher for `folio publish --watch`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐    ┌──────────────┐    ┌──────────────────────────┐
//! │ notify   │───▶│ ReindexQueue │───▶│ run_pending()            │
//! │ events   │    │ (300ms)      │    │  republish each draft    │
//! └──────────┘    └──────────────┘    │  then one index pass     │
//!                                     └──────────────────────────┘
//! ```
//!
//! Reindexing is single-flight: events that arrive while a run is in progress
//! wait in the channel and are coalesced into the next run.

use crate::{
    config::SiteConfig,
    log,
    logger::WatchStatus,
    publish::{is_draft, publish_all, publish_draft, reindex},
};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{Receiver, RecvTimeoutError},
    time::{Duration, Instant},
};

const DEBOUNCE_MS: u64 = 300;

// =============================================================================
// Path Utilities
// =============================================================================

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

const fn is_relevant(event: &Event) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
}

// =============================================================================
// Reindex Queue
// =============================================================================

/// Pending drafts, deduplicated, released after a quiet period.
struct ReindexQueue {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
}

impl ReindexQueue {
    fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
        }
    }

    fn add(&mut self, event: Event) {
        if !is_relevant(&event) {
            return;
        }
        for path in event.paths {
            if is_draft(&path) && !is_temp_file(&path) {
                self.pending.insert(path);
            }
        }
        self.last_event = Some(Instant::now());
    }

    /// Move every event already waiting in the channel into the queue.
    fn drain(&mut self, rx: &Receiver<notify::Result<Event>>) {
        while let Ok(result) = rx.try_recv() {
            match result {
                Ok(event) => self.add(event),
                Err(e) => log!("watch"; "error: {e}"),
            }
        }
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    /// Take all pending drafts in file-name order.
    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        let mut paths: Vec<_> = self.pending.drain().collect();
        paths.sort();
        paths
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

// =============================================================================
// Run
// =============================================================================

/// Result of one coalesced republish + reindex run.
#[derive(Debug, Default)]
struct WatchRun {
    republished: Vec<String>,
    failed: Vec<(String, String)>,
    /// Articles indexed, `None` when the index pass failed.
    indexed: Option<usize>,
}

/// Republish each pending draft once, then regenerate the index once.
fn run_pending(paths: &[PathBuf], config: &SiteConfig) -> WatchRun {
    let mut run = WatchRun::default();

    for path in paths {
        let name = display_name(path);
        if !path.exists() {
            // renamed or deleted before the run started
            continue;
        }
        match publish_draft(path, config) {
            Ok(Some(_)) => run.republished.push(name),
            Ok(None) => {}
            Err(err) => run.failed.push((name, err.to_string())),
        }
    }

    run.indexed = reindex(config).map(|report| report.indexed);
    run
}

fn report_run(run: &WatchRun, status: &mut WatchStatus) {
    let Some(indexed) = run.indexed else {
        status.error("index update failed", "");
        return;
    };

    if run.failed.is_empty() {
        status.success(&format!(
            "republished {}, {} articles indexed",
            run.republished.join(", "),
            indexed
        ));
    } else {
        let detail = run
            .failed
            .iter()
            .map(|(name, err)| format!("  {name}: {err}"))
            .collect::<Vec<_>>()
            .join("\n");
        status.error(
            &format!("{} draft(s) failed, {} articles indexed", run.failed.len(), indexed),
            &detail,
        );
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Publish everything once, then republish drafts as they change.
///
/// Blocks until the process is interrupted.
pub fn watch_drafts(config: &SiteConfig) -> Result<()> {
    publish_all(config)?;

    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    watcher
        .watch(&config.blog.drafts, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch drafts: {}", config.blog.drafts.display()))?;
    log!("watch"; "watching {} for changes", config.blog.drafts.display());

    let mut queue = ReindexQueue::new();
    let mut status = WatchStatus::new();

    loop {
        match rx.recv_timeout(queue.timeout()) {
            Ok(Ok(event)) => queue.add(event),
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(RecvTimeoutError::Timeout) if queue.ready() => {
                queue.drain(&rx);
                let run = run_pending(&queue.take(), config);
                report_run(&run, &mut status);
            }
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    Ok(())
}
