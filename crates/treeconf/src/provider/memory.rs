//! In-memory provider.

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::{Mutex, RwLock};

use super::{Provider, ProviderError};

/// Provider whose payload lives in memory.
///
/// [`update`](MemoryProvider::update) replaces the payload and signals a
/// change; [`close`](MemoryProvider::close) ends the change stream, which
/// stops any reload loop reading from it.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use treeconf::{Configuration, Format, MemoryProvider, DecodeOptions};
///
/// let provider = Arc::new(MemoryProvider::new("mem", br#"{"level": "info"}"#.to_vec()));
/// let config = Configuration::new();
///
/// let handle = config
///     .load_from_data_source(provider.clone(), Format::Json, DecodeOptions::default())
///     .unwrap();
/// assert_eq!(config.get_string("level"), "info");
///
/// provider.close();
/// handle.join();
/// ```
pub struct MemoryProvider {
    name: String,
    content: RwLock<Vec<u8>>,
    signal: Mutex<Option<Sender<()>>>,
    changes: Receiver<()>,
}

impl MemoryProvider {
    /// Creates a provider holding `content`.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let (tx, rx) = unbounded();

        Self {
            name: name.into(),
            content: RwLock::new(content.into()),
            signal: Mutex::new(Some(tx)),
            changes: rx,
        }
    }

    /// Replaces the payload and signals a change.
    ///
    /// Returns `false` if the provider was closed; the payload is still
    /// replaced but nobody is told.
    pub fn update(&self, content: impl Into<Vec<u8>>) -> bool {
        *self.content.write() = content.into();

        self.notify()
    }

    /// Signals a change without replacing the payload.
    pub fn notify(&self) -> bool {
        self.signal
            .lock()
            .as_ref()
            .is_some_and(|tx| tx.send(()).is_ok())
    }

    /// Ends the change stream.
    ///
    /// Signals already queued are still delivered before the stream ends.
    pub fn close(&self) {
        self.signal.lock().take();
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.signal.lock().is_none()
    }
}

impl Provider for MemoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<Vec<u8>, ProviderError> {
        Ok(self.content.read().clone())
    }

    fn changes(&self) -> Receiver<()> {
        self.changes.clone()
    }
}

impl std::fmt::Debug for MemoryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryProvider")
            .field("name", &self.name)
            .field("len", &self.content.read().len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
