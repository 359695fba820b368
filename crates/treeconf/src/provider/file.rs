//! File-backed provider with filesystem change notifications.
//!
//! The parent directory is watched rather than the file itself so that
//! editors which save by writing a temporary file and renaming it over the
//! original keep producing events.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, bounded, select, unbounded};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;

use super::{Provider, ProviderError};

const PROVIDER_NAME: &str = "file";
const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Provider that reads a configuration file and signals when it changes.
///
/// Filesystem events are debounced: a burst of events closer together than
/// the debounce window produces a single signal once the burst settles.
/// Call [`stop`](FileProvider::stop) to end the change stream.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use treeconf::{Configuration, DecodeOptions, FileProvider, Format};
///
/// let provider = Arc::new(FileProvider::new("config.toml")?);
/// let config = Configuration::new();
///
/// let handle = config.load_from_data_source(provider.clone(), Format::Toml, DecodeOptions::default())?;
///
/// // ... later ...
/// provider.stop();
/// handle.join();
/// ```
pub struct FileProvider {
    path: PathBuf,
    changes: Receiver<()>,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl FileProvider {
    /// Watches `path` with the default 100ms debounce.
    ///
    /// # Errors
    ///
    /// Returns an error if neither the file nor its parent directory exists,
    /// or if the platform watcher cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        Self::with_debounce(path, DEFAULT_DEBOUNCE)
    }

    /// Watches `path`, coalescing events that arrive within `debounce`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither the file nor its parent directory exists,
    /// or if the platform watcher cannot be created.
    pub fn with_debounce(path: impl AsRef<Path>, debounce: Duration) -> Result<Self, ProviderError> {
        let path = path.as_ref().to_path_buf();

        let (notify_tx, notify_rx) = bounded::<notify::Result<Event>>(100);
        let (signal_tx, signal_rx) = unbounded();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })
        .map_err(|e| {
            ProviderError::connection_with_source(
                PROVIDER_NAME,
                "failed to create file watcher",
                e,
            )
        })?;

        let target = watch_target(&path)?;
        watcher
            .watch(&target, RecursiveMode::NonRecursive)
            .map_err(|e| {
                ProviderError::connection_with_source(
                    PROVIDER_NAME,
                    format!("failed to watch {}", target.display()),
                    e,
                )
            })?;

        let watched = watched_paths(&path);

        thread::Builder::new()
            .name("treeconf-file-watch".to_string())
            .spawn(move || debounce_loop(&notify_rx, &signal_tx, &watched, debounce))
            .map_err(|e| {
                ProviderError::connection_with_source(
                    PROVIDER_NAME,
                    "failed to spawn watcher thread",
                    e,
                )
            })?;

        tracing::debug!(path = %path.display(), ?debounce, "watching configuration file");

        Ok(Self {
            path,
            changes: signal_rx,
            watcher: Mutex::new(Some(watcher)),
        })
    }

    /// The watched file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stops watching and ends the change stream.
    pub fn stop(&self) {
        if self.watcher.lock().take().is_some() {
            tracing::debug!(path = %self.path.display(), "stopped watching configuration file");
        }
    }

    /// Returns `true` until [`stop`](Self::stop) is called.
    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.watcher.lock().is_some()
    }
}

impl Provider for FileProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn read(&self) -> Result<Vec<u8>, ProviderError> {
        std::fs::read(&self.path).map_err(|source| ProviderError::Io {
            provider: PROVIDER_NAME.to_string(),
            path: self.path.clone(),
            source,
        })
    }

    fn changes(&self) -> Receiver<()> {
        self.changes.clone()
    }
}

impl std::fmt::Debug for FileProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileProvider")
            .field("path", &self.path)
            .field("watching", &self.is_watching())
            .finish()
    }
}

/// The directory to register with the platform watcher.
fn watch_target(path: &Path) -> Result<PathBuf, ProviderError> {
    let parent = match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),

        Some(parent) => parent,

        None => {
            return Err(ProviderError::unavailable(
                PROVIDER_NAME,
                format!("invalid path: {}", path.display()),
            ));
        }
    };

    if parent.is_dir() {
        Ok(parent.to_path_buf())
    } else {
        Err(ProviderError::unavailable(
            PROVIDER_NAME,
            format!("parent directory of {} does not exist", path.display()),
        ))
    }
}

/// Every spelling of `path` an event might carry.
fn watched_paths(path: &Path) -> HashSet<PathBuf> {
    let mut paths = HashSet::from([path.to_path_buf()]);

    if let Ok(canonical) = path.canonicalize() {
        paths.insert(canonical);
    }

    // The file may not exist yet; its canonical parent still does.
    if let (Some(parent), Some(file_name)) = (path.parent(), path.file_name()) {
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };

        if let Ok(canonical_parent) = parent.canonicalize() {
            paths.insert(canonical_parent.join(file_name));
        }
        paths.insert(parent.join(file_name));
    }

    paths
}

fn is_relevant(event: &Event, watched: &HashSet<PathBuf>) -> bool {
    let kind_matches = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );

    kind_matches
        && event.paths.iter().any(|path| {
            watched.contains(path) || path.canonicalize().is_ok_and(|c| watched.contains(&c))
        })
}

/// Turns raw notify events into debounced change signals.
///
/// Returns when the watcher is dropped or the last signal receiver is gone.
fn debounce_loop(
    notify_rx: &Receiver<notify::Result<Event>>,
    signal_tx: &Sender<()>,
    watched: &HashSet<PathBuf>,
    debounce: Duration,
) {
    let mut pending = false;
    let mut last_event = Instant::now();

    loop {
        select! {
            recv(notify_rx) -> event => match event {
                Ok(Ok(event)) => {
                    if is_relevant(&event, watched) {
                        pending = true;
                        last_event = Instant::now();
                    }
                }

                Ok(Err(e)) => tracing::warn!(error = %e, "file watcher error"),

                Err(_) => break,
            },

            default(debounce) => {
                if pending && last_event.elapsed() >= debounce {
                    pending = false;
                    if signal_tx.send(()).is_err() {
                        break;
                    }
                }
            }
        }
    }
}
