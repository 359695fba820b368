//! Fire-and-forget callback dispatch.
//!
//! Every callback runs on its own thread. A panicking callback is logged and
//! discarded; it never reaches the caller that produced the change and never
//! prevents sibling callbacks from running.

use std::panic::{self, AssertUnwindSafe};
use std::thread;

use super::types::{ChangeCallback, ConfigChange};

const NOTIFY_THREAD_NAME: &str = "treeconf-notify";

/// Spawns one detached thread per callback.
pub(crate) fn dispatch(callbacks: Vec<ChangeCallback>, change: &ConfigChange) {
    for callback in callbacks {
        let change = change.clone();

        let spawned = thread::Builder::new()
            .name(NOTIFY_THREAD_NAME.to_string())
            .spawn(move || invoke(&callback, &change));

        if let Err(e) = spawned {
            tracing::error!(error = %e, "failed to spawn change callback thread");
        }
    }
}

/// Runs `callback` on the current thread, containing any panic.
///
/// Returns `false` if the callback panicked.
pub(crate) fn invoke(callback: &ChangeCallback, change: &ConfigChange) -> bool {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback(change)));

    if let Err(payload) = outcome {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());

        tracing::error!(
            trigger = %change.trigger,
            generation = change.generation,
            panic = %message,
            "change callback panicked"
        );
        return false;
    }

    true
}
