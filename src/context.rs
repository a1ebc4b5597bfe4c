//! Thread-scoped key/value context attached to every record written from
//! the current thread.
//!
//! Application code fills it at the start of a unit of work (request id,
//! user id, ...) and clears it at the end. The writer only ever reads a
//! snapshot of it.

use std::cell::RefCell;
use std::collections::BTreeMap;

thread_local! {
    static CONTEXT: RefCell<BTreeMap<String, String>> = RefCell::new(BTreeMap::new());
}

/// Set `key` to `value` for the current thread.
pub fn put(key: impl Into<String>, value: impl Into<String>) {
    CONTEXT.with(|c| {
        c.borrow_mut().insert(key.into(), value.into());
    });
}

/// Remove `key`, returning its previous value.
pub fn remove(key: &str) -> Option<String> {
    CONTEXT.with(|c| c.borrow_mut().remove(key))
}

/// Remove every entry for the current thread.
pub fn clear() {
    CONTEXT.with(|c| c.borrow_mut().clear());
}

/// Copy of the current thread's context.
///
/// Empty once the thread's storage has been torn down, so it is safe to
/// call from a panic hook or another thread-local's destructor.
pub fn snapshot() -> BTreeMap<String, String> {
    CONTEXT
        .try_with(|c| c.borrow().clone())
        .unwrap_or_default()
}

/// Set `key` for as long as the returned guard lives.
///
/// On drop the previous value (if any) is restored, so nested scopes
/// behave like a stack.
pub fn scoped(key: impl Into<String>, value: impl Into<String>) -> ContextGuard {
    let key = key.into();
    let previous = CONTEXT.with(|c| c.borrow_mut().insert(key.clone(), value.into()));
    ContextGuard { key, previous }
}

/// Guard returned by [`scoped`].
#[must_use = "the context entry is removed as soon as the guard is dropped"]
pub struct ContextGuard {
    key: String,
    previous: Option<String>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let key = std::mem::take(&mut self.key);
        match self.previous.take() {
            Some(value) => put(key, value),
            None => {
                remove(&key);
            }
        }
    }
}
