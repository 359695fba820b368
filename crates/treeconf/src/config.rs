//! The configuration store.
//!
//! A [`Configuration`] owns one nested tree. Every [`load`](Configuration::load)
//! or [`set`](Configuration::set) runs a single generation under the write
//! lock:
//!
//! 1. merge the incoming mapping into the tree,
//! 2. flatten the tree into dotted keys,
//! 3. reconcile the flattening with the key cache, collecting the keys whose
//!    cached value changed,
//! 4. pick the callbacks affected by those keys.
//!
//! The lock is released before the callbacks are dispatched.

use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossbeam_channel::Receiver;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;

use crate::cache::KeyCache;
use crate::codec::Decoder;
use crate::de::{self, DecodeOptions};
use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::tree;
use crate::value::{ConfigValue, Map};
use crate::watch::{self, ChangeCallback, ChangeSet, ChangeTrigger, ConfigChange, Registry};

const DEFAULT_KEY_DELIM: &str = ".";
const RELOAD_THREAD_NAME: &str = "treeconf-reload";

/// A hierarchical, thread-safe configuration store.
///
/// Cloning is cheap and every clone shares the same tree, cache and
/// listeners. Callbacks receive a clone in [`ConfigChange::config`].
///
/// # Example
///
/// ```rust
/// use treeconf::{Configuration, Format};
///
/// let config = Configuration::new();
/// config.load(br#"{"db": {"host": "localhost", "port": 5432}}"#, &Format::Json)?;
/// config.load(br#"{"db": {"port": 6432}}"#, &Format::Json)?;
///
/// assert_eq!(config.get_string("db.host"), "localhost");
/// assert_eq!(config.get_int("db.port"), 6432);
/// assert_eq!(config.get_int("db.missing"), 0);
/// # Ok::<(), treeconf::Error>(())
/// ```
#[derive(Clone)]
pub struct Configuration {
    shared: Arc<Shared>,
}

struct Shared {
    state: RwLock<State>,
    cache: KeyCache,
    generation: AtomicU64,
}

/// A committed generation whose callbacks have not run yet.
struct Pending {
    changes: ChangeSet,
    callbacks: Vec<ChangeCallback>,
    generation: u64,
}

struct State {
    tree: Map,
    key_delim: String,
    raw: Vec<u8>,
    registry: Registry,
    decode_options: DecodeOptions,
}

impl Configuration {
    /// Creates an empty configuration using `.` as the key delimiter.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tree(Map::new(), DEFAULT_KEY_DELIM.to_string(), DecodeOptions::default())
    }

    fn with_tree(tree: Map, key_delim: String, decode_options: DecodeOptions) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(State {
                    tree,
                    key_delim,
                    raw: Vec::new(),
                    registry: Registry::default(),
                    decode_options,
                }),
                cache: KeyCache::new(),
                generation: AtomicU64::new(0),
            }),
        }
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Changes the delimiter used to split and join dotted keys.
    ///
    /// The key cache is rebuilt for the new delimiter, so values cached
    /// under the old spelling are forgotten. An empty delimiter is ignored.
    pub fn set_key_delim(&self, delim: impl Into<String>) {
        let delim = delim.into();
        if delim.is_empty() {
            tracing::warn!("ignoring empty key delimiter");
            return;
        }

        let mut state = self.shared.state.write();
        state.key_delim = delim;

        self.shared.cache.clear();
        self.shared
            .cache
            .reconcile(&tree::flatten(&state.tree, &state.key_delim), &state.key_delim);
    }

    /// The current key delimiter.
    #[must_use]
    pub fn key_delim(&self) -> String {
        self.shared.state.read().key_delim.clone()
    }

    /// Sets the options used by [`unmarshal_key`](Self::unmarshal_key).
    pub fn set_decode_options(&self, options: DecodeOptions) {
        self.shared.state.write().decode_options = options;
    }

    /// The options used by [`unmarshal_key`](Self::unmarshal_key).
    #[must_use]
    pub fn decode_options(&self) -> DecodeOptions {
        self.shared.state.read().decode_options
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Decodes `content` and deep-merges it into the tree.
    ///
    /// Returns the keys whose value changed. On a decode error the tree and
    /// the stored raw payload are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the decoder rejects the payload.
    pub fn load(&self, content: &[u8], decoder: &(impl Decoder + ?Sized)) -> Result<ChangeSet> {
        self.load_with(content, decoder, ChangeTrigger::Load)
    }

    /// Reads `reader` to the end, then behaves like [`load`](Self::load).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Read`] if reading fails, or [`Error::Decode`] if the
    /// payload cannot be decoded.
    pub fn load_from_reader(
        &self,
        mut reader: impl Read,
        decoder: &(impl Decoder + ?Sized),
    ) -> Result<ChangeSet> {
        let mut content = Vec::new();
        reader
            .read_to_end(&mut content)
            .map_err(|source| Error::Read { source })?;

        self.load(&content, decoder)
    }

    fn load_with(
        &self,
        content: &[u8],
        decoder: &(impl Decoder + ?Sized),
        trigger: ChangeTrigger,
    ) -> Result<ChangeSet> {
        let pending = self.merge_payload(content, decoder, &trigger)?;

        Ok(self.notify(trigger, pending))
    }

    /// Decodes and merges `content` without dispatching any callback.
    fn merge_payload(
        &self,
        content: &[u8],
        decoder: &(impl Decoder + ?Sized),
        trigger: &ChangeTrigger,
    ) -> Result<Pending> {
        let incoming = decoder.decode(content)?;

        Ok(self.commit(trigger, |state| {
            state.raw = content.to_vec();
            tree::merge(&mut state.tree, incoming);
        }))
    }

    /// Loads from `provider` now and again every time it signals a change.
    ///
    /// `options` become this instance's default decode options. After the
    /// first successful load, every [`on_change`](Self::on_change) callback
    /// runs once on the calling thread with [`ChangeTrigger::Initial`]. Only
    /// then are the callbacks affected by that first merge dispatched (with
    /// [`ChangeTrigger::Load`]), which happens when the instance already held
    /// values the provider overrides.
    ///
    /// A background thread then waits on the provider's change stream. Each
    /// signal re-reads and re-merges the payload; read and decode failures
    /// in that loop are logged and skipped, keeping the previous tree. The
    /// loop ends when the change stream ends.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Source`] or [`Error::Decode`] if the first load
    /// fails, in which case no callback runs and no thread is started, or
    /// [`Error::Spawn`] if the thread cannot be created.
    pub fn load_from_data_source<P, D>(
        &self,
        provider: P,
        decoder: D,
        options: DecodeOptions,
    ) -> Result<ReloadHandle>
    where
        P: Provider + 'static,
        D: Decoder + 'static,
    {
        self.set_decode_options(options);

        let name = provider.name().to_string();
        let changes = provider.changes();

        let content = provider.read()?;
        let pending = self.merge_payload(&content, &decoder, &ChangeTrigger::Load)?;

        self.run_initial_hooks();
        self.notify(ChangeTrigger::Load, pending);

        let running = Arc::new(AtomicBool::new(true));
        let guard = RunningGuard(running.clone());
        let config = self.clone();

        let thread = thread::Builder::new()
            .name(RELOAD_THREAD_NAME.to_string())
            .spawn(move || {
                let _guard = guard;
                config.reload_loop(&provider, &decoder, &changes);
            })
            .map_err(|source| Error::Spawn {
                provider: name.clone(),
                source,
            })?;

        Ok(ReloadHandle {
            provider: name,
            running,
            thread: Some(thread),
        })
    }

    fn reload_loop(&self, provider: &impl Provider, decoder: &impl Decoder, changes: &Receiver<()>) {
        let name = provider.name();
        tracing::info!(provider = name, "configuration reload loop started");

        for () in changes.iter() {
            let trigger = ChangeTrigger::SourceChanged(name.to_string());
            let outcome = provider
                .read()
                .map_err(Error::from_provider)
                .and_then(|content| self.load_with(&content, decoder, trigger));

            match outcome {
                Ok(changed) => {
                    tracing::debug!(provider = name, changed = changed.len(), "configuration reloaded");
                }

                Err(e) => {
                    tracing::warn!(
                        provider = name,
                        error = %e,
                        "configuration reload failed, keeping previous configuration"
                    );
                }
            }
        }

        tracing::info!(provider = name, "configuration reload loop stopped");
    }

    fn run_initial_hooks(&self) {
        let callbacks = self.shared.state.read().registry.global();
        let change = ConfigChange::initial(self.clone());

        for callback in &callbacks {
            watch::invoke(callback, &change);
        }
    }

    /// Assigns `value` at the dotted `key`, creating intermediate mappings.
    ///
    /// Any scalar found on the way is replaced by a mapping. Returns the
    /// keys whose value changed.
    ///
    /// # Example
    ///
    /// ```rust
    /// use treeconf::Configuration;
    ///
    /// let config = Configuration::new();
    /// config.set("server.http.port", 8080);
    ///
    /// assert_eq!(config.get_int("server.http.port"), 8080);
    /// assert_eq!(config.get_string_map("server").len(), 1);
    /// ```
    pub fn set(&self, key: &str, value: impl Into<ConfigValue>) -> ChangeSet {
        let value = value.into();
        let trigger = ChangeTrigger::Set(key.to_string());

        let pending = self.commit(&trigger, |state| {
            let path: Vec<&str> = key.split(state.key_delim.as_str()).collect();
            tree::insert_path(&mut state.tree, &path, value);
        });

        self.notify(trigger, pending)
    }

    /// Runs one merge generation under the write lock.
    ///
    /// The affected callbacks are collected but not dispatched.
    fn commit(&self, trigger: &ChangeTrigger, mutate: impl FnOnce(&mut State)) -> Pending {
        let pending = {
            let mut state = self.shared.state.write();
            mutate(&mut state);

            let flat = tree::flatten(&state.tree, &state.key_delim);
            let changes = self.shared.cache.reconcile(&flat, &state.key_delim);
            let generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;
            let callbacks = state.registry.affected(&changes);

            Pending {
                changes,
                callbacks,
                generation,
            }
        };

        tracing::debug!(
            generation = pending.generation,
            %trigger,
            changed = pending.changes.len(),
            notified = pending.callbacks.len(),
            "applied configuration generation"
        );

        pending
    }

    /// Dispatches the callbacks collected by [`commit`](Self::commit).
    fn notify(&self, trigger: ChangeTrigger, pending: Pending) -> ChangeSet {
        let Pending {
            changes,
            callbacks,
            generation,
        } = pending;

        if !callbacks.is_empty() {
            let change = ConfigChange::new(self.clone(), changes.clone(), trigger, generation);
            watch::dispatch(callbacks, &change);
        }

        changes
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    /// Registers a callback for every generation that changes a key.
    ///
    /// It also runs once when [`load_from_data_source`](Self::load_from_data_source)
    /// completes its first load.
    pub fn on_change(&self, callback: impl Fn(&ConfigChange) + Send + Sync + 'static) {
        self.shared.state.write().registry.on_change(Arc::new(callback));
    }

    /// Registers a callback for changes to keys starting with `prefix`.
    ///
    /// Matching is a plain string-prefix test on the dotted key: `"db"`
    /// matches `"db.host"` and also `"dbx.flag"`. End the prefix with the
    /// delimiter (`"db."`) to watch exactly one subtree.
    pub fn watch(
        &self,
        prefix: impl Into<String>,
        callback: impl Fn(&ConfigChange) + Send + Sync + 'static,
    ) {
        self.shared
            .state
            .write()
            .registry
            .watch(prefix, Arc::new(callback));
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Resolves `key`, consulting the key cache first.
    ///
    /// A cached miss is returned as-is until the next generation evicts it.
    fn find(&self, key: &str) -> ConfigValue {
        if let Some(value) = self.shared.cache.get(key) {
            return value;
        }

        // The read guard is held across the insert so a concurrent
        // generation cannot interleave and leave a stale entry behind.
        let state = self.shared.state.read();
        let segments: Vec<&str> = key.split(state.key_delim.as_str()).collect();
        let value = tree::lookup(&state.tree, &segments);
        self.shared.cache.insert(key, value.clone());

        value
    }

    /// Returns the value at `key`, or `None` if it is absent or null.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        Some(self.find(key)).filter(|value| !value.is_null())
    }

    /// Returns `true` if `key` resolves to a non-null value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the value at `key` as a string, or `""`.
    #[must_use]
    pub fn get_string(&self, key: &str) -> String {
        self.find(key).to_text().unwrap_or_default()
    }

    /// Returns the value at `key` as a boolean, or `false`.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        self.find(key).to_bool().unwrap_or_default()
    }

    /// Returns the value at `key` as an `i32`, or `0`.
    #[must_use]
    pub fn get_int(&self, key: &str) -> i32 {
        self.find(key).to_i32().unwrap_or_default()
    }

    /// Returns the value at `key` as an `i64`, or `0`.
    #[must_use]
    pub fn get_int64(&self, key: &str) -> i64 {
        self.find(key).to_i64().unwrap_or_default()
    }

    /// Returns the value at `key` as an `f64`, or `0.0`.
    #[must_use]
    pub fn get_float64(&self, key: &str) -> f64 {
        self.find(key).to_f64().unwrap_or_default()
    }

    /// Returns the value at `key` as a UTC timestamp, or the Unix epoch.
    #[must_use]
    pub fn get_time(&self, key: &str) -> DateTime<Utc> {
        self.find(key).to_time().unwrap_or_default()
    }

    /// Returns the value at `key` as a duration, or zero.
    ///
    /// Numbers are nanoseconds; text uses unit suffixes such as `"1m30s"`.
    #[must_use]
    pub fn get_duration(&self, key: &str) -> Duration {
        self.find(key).to_duration().unwrap_or_default()
    }

    /// Returns the value at `key` as a list of strings, or an empty list.
    ///
    /// A single string is split on whitespace.
    #[must_use]
    pub fn get_string_slice(&self, key: &str) -> Vec<String> {
        self.find(key).to_string_slice().unwrap_or_default()
    }

    /// Returns the value at `key` as a list, or an empty list.
    #[must_use]
    pub fn get_slice(&self, key: &str) -> Vec<ConfigValue> {
        self.find(key).to_slice().unwrap_or_default()
    }

    /// Returns the mapping at `key`, or an empty mapping.
    #[must_use]
    pub fn get_string_map(&self, key: &str) -> Map {
        self.find(key).to_string_map().unwrap_or_default()
    }

    /// Returns the mapping at `key` with every value as a string.
    #[must_use]
    pub fn get_string_map_string(&self, key: &str) -> HashMap<String, String> {
        self.find(key).to_string_map_string().unwrap_or_default()
    }

    /// Returns the mapping at `key` with every value as a list of strings.
    #[must_use]
    pub fn get_string_map_string_slice(&self, key: &str) -> HashMap<String, Vec<String>> {
        self.find(key).to_string_map_string_slice().unwrap_or_default()
    }

    /// Returns the list of mappings at `key`, or an empty list.
    #[must_use]
    pub fn get_slice_string_map(&self, key: &str) -> Vec<Map> {
        self.find(key).to_slice_string_map().unwrap_or_default()
    }

    // ========================================================================
    // Decoding
    // ========================================================================

    /// Decodes the value at `key` into `T` with this instance's options.
    ///
    /// An empty key decodes the whole tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if `key` resolves to nothing, or
    /// [`Error::Unmarshal`] if the value does not fit `T`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use serde::Deserialize;
    /// use treeconf::{Configuration, Format};
    ///
    /// #[derive(Debug, Deserialize)]
    /// struct Db {
    ///     host: String,
    ///     port: u16,
    /// }
    ///
    /// let config = Configuration::new();
    /// config.load(br#"{"db": {"Host": "localhost", "port": 5432}}"#, &Format::Json)?;
    ///
    /// let db: Db = config.unmarshal_key("db")?;
    /// assert_eq!(db.host, "localhost");
    /// assert!(config.unmarshal_key::<Db>("cache").unwrap_err().is_invalid_key());
    /// # Ok::<(), treeconf::Error>(())
    /// ```
    pub fn unmarshal_key<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let options = self.decode_options();
        self.unmarshal_key_with(key, &options)
    }

    /// Decodes the value at `key` into `T` with explicit options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if `key` resolves to nothing, or
    /// [`Error::Unmarshal`] if the value does not fit `T`.
    pub fn unmarshal_key_with<T: DeserializeOwned>(
        &self,
        key: &str,
        options: &DecodeOptions,
    ) -> Result<T> {
        let value = if key.is_empty() {
            ConfigValue::Map(self.shared.state.read().tree.clone())
        } else {
            self.find(key)
        };

        if value.is_null() {
            return Err(Error::InvalidKey {
                key: key.to_string(),
            });
        }

        de::from_value(value, options).map_err(|e| Error::unmarshal(key, &e))
    }

    /// Decodes the value at `key`, returning `expect` if that fails.
    ///
    /// Decoding is all-or-nothing: on failure `expect` is returned as given,
    /// with none of the fields that did decode copied into it.
    ///
    /// ```rust
    /// use serde::Deserialize;
    /// use treeconf::Configuration;
    ///
    /// #[derive(Debug, PartialEq, Deserialize)]
    /// struct Server {
    ///     host: String,
    ///     port: u16,
    /// }
    ///
    /// let config = Configuration::new();
    /// config.set("server.host", "example.com");
    /// config.set("server.port", "not a port");
    ///
    /// let fallback = || Server { host: "localhost".into(), port: 8080 };
    /// assert_eq!(config.unmarshal_with_expect("server", fallback()), fallback());
    /// ```
    #[must_use]
    pub fn unmarshal_with_expect<T: DeserializeOwned>(&self, key: &str, expect: T) -> T {
        match self.unmarshal_key(key) {
            Ok(value) => value,

            Err(e) => {
                tracing::debug!(key, error = %e, "unmarshal failed, using expected value");
                expect
            }
        }
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Creates a detached configuration from the mapping at `key`.
    ///
    /// The child copies the subtree, the key delimiter and the decode
    /// options. It has its own cache and no listeners, and later changes to
    /// either instance are not seen by the other.
    #[must_use]
    pub fn sub(&self, key: &str) -> Configuration {
        let subtree = self.get_string_map(key);
        let (key_delim, decode_options) = {
            let state = self.shared.state.read();
            (state.key_delim.clone(), state.decode_options)
        };

        Self::with_tree(subtree, key_delim, decode_options)
    }

    /// The last payload that decoded successfully.
    #[must_use]
    pub fn raw_config(&self) -> Vec<u8> {
        self.shared.state.read().raw.clone()
    }

    /// Every dotted key currently in the tree, sorted.
    #[must_use]
    pub fn all_keys(&self) -> Vec<String> {
        let state = self.shared.state.read();
        let mut keys: Vec<String> = tree::flatten(&state.tree, &state.key_delim)
            .into_keys()
            .collect();
        keys.sort_unstable();

        keys
    }

    /// A copy of the whole tree.
    #[must_use]
    pub fn snapshot(&self) -> Map {
        self.shared.state.read().tree.clone()
    }

    /// Number of merge generations applied so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::Acquire)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.read();

        f.debug_struct("Configuration")
            .field("key_delim", &state.key_delim)
            .field("top_level_keys", &state.tree.len())
            .field("cached_keys", &self.shared.cache.len())
            .field("listeners", &state.registry.len())
            .field("generation", &self.generation())
            .finish()
    }
}

// ============================================================================
// Reload handle
// ============================================================================

/// Handle to the background loop started by
/// [`Configuration::load_from_data_source`].
///
/// Dropping the handle detaches the loop; it keeps running until the
/// provider's change stream ends.
#[derive(Debug)]
pub struct ReloadHandle {
    provider: String,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ReloadHandle {
    /// Name of the provider feeding the loop.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        &self.provider
    }

    /// Returns `true` while the loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Blocks until the loop ends.
    ///
    /// Returns `false` if the loop thread panicked.
    pub fn join(mut self) -> bool {
        self.thread.take().is_none_or(|thread| thread.join().is_ok())
    }
}

/// Clears the running flag when the loop thread exits, panicking or not.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use crate::Format;

    use super::*;

    fn loaded(json: &str) -> Configuration {
        let config = Configuration::new();
        config.load(json.as_bytes(), &Format::Json).unwrap();
        config
    }

    #[test]
    fn test_decode_error_keeps_tree_and_raw() {
        let config = loaded(r#"{"a": 1}"#);

        assert!(config.load(b"{broken", &Format::Json).is_err());
        assert_eq!(config.get_int("a"), 1);
        assert_eq!(config.raw_config(), br#"{"a": 1}"#.to_vec());
    }

    #[test]
    fn test_negative_cache_until_next_generation() {
        let config = Configuration::new();

        assert_eq!(config.get("x"), None);
        assert_eq!(config.shared.cache.get("x"), Some(ConfigValue::Null));

        let changes = config.set("x", 1);
        assert!(changes.contains("x"));
        assert_eq!(config.get("x"), Some(ConfigValue::from(1)));
    }

    #[test]
    fn test_custom_key_delim() {
        let config = loaded(r#"{"a": {"b": 2}}"#);
        assert_eq!(config.get_int("a.b"), 2);

        config.set_key_delim("/");
        assert_eq!(config.key_delim(), "/");
        assert_eq!(config.get_int("a/b"), 2);

        config.set("a/c", 3);
        assert_eq!(config.all_keys(), vec!["a/b".to_string(), "a/c".to_string()]);
    }

    #[test]
    fn test_empty_key_delim_ignored() {
        let config = Configuration::new();
        config.set_key_delim("");

        assert_eq!(config.key_delim(), ".");
    }

    #[test]
    fn test_generation_counts_every_merge() {
        let config = Configuration::new();
        config.set("a", 1);
        config.set("a", 1);

        assert_eq!(config.generation(), 2);
    }

    #[test]
    fn test_set_replaces_scalar_on_path() {
        let config = loaded(r#"{"a": 5}"#);
        config.set("a.b", 1);

        assert_eq!(config.get_int("a.b"), 1);
        assert!(config.get_string_map("a").contains_key("b"));
        assert!(config.get("a").is_some_and(|value| value.is_map()));
        assert_eq!(config.sub("a").get_int("b"), 1);
    }

    #[test]
    fn test_reload_handle_join_after_close() {
        let provider = Arc::new(crate::MemoryProvider::new("mem", br#"{"a": 1}"#.to_vec()));
        let config = Configuration::new();

        let handle = config
            .load_from_data_source(provider.clone(), Format::Json, DecodeOptions::default())
            .unwrap();
        assert_eq!(handle.provider_name(), "mem");

        provider.close();
        assert!(handle.join());
    }
}
