//! Ambient request context.
//!
//! The engine reads request-context values through [`ContextSource`]. Two
//! stores are provided: [`ThreadContext`], a per-thread map that the caller
//! fills for the duration of one unit of work, and [`RequestContext`], an
//! owned map that can be passed explicitly.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::marker::PhantomData;

/// Read access to request-context values.
pub trait ContextSource: Send + Sync + Debug {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Returns true if a value is stored under `key`.
    fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// An owned request-context map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    values: BTreeMap<String, String>,
}

impl RequestContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value.
    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a value, returning the previous one.
    pub fn insert(&mut self, key: &str, value: &str) -> Option<String> {
        self.values.insert(key.to_string(), value.to_string())
    }

    /// Removes a value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Returns the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the context holds no value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the values in key order.
    #[must_use]
    pub const fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

impl ContextSource for RequestContext {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl From<BTreeMap<String, String>> for RequestContext {
    fn from(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }
}

thread_local! {
    static THREAD_CONTEXT: RefCell<BTreeMap<String, String>> = const { RefCell::new(BTreeMap::new()) };
}

/// Per-thread request context.
///
/// The struct itself holds no data; every method reads or writes the map of
/// the calling thread. Use [`ThreadContext::scope`] to establish values for
/// one unit of work and have them removed when it ends.
///
/// ```
/// use tessera_audit::{ContextSource, RequestContext, ThreadContext};
///
/// {
///     let _guard = ThreadContext::scope(RequestContext::new().with("userId", "42"));
///     assert_eq!(ThreadContext.get("userId").as_deref(), Some("42"));
/// }
/// assert!(!ThreadContext.contains_key("userId"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadContext;

impl ThreadContext {
    /// Replaces the calling thread's context until the guard is dropped.
    #[must_use = "the context is cleared as soon as the guard is dropped"]
    pub fn scope(context: RequestContext) -> ContextGuard {
        let previous = THREAD_CONTEXT.with(|ctx| ctx.replace(context.values));
        ContextGuard {
            previous: Some(previous),
            _not_send: PhantomData,
        }
    }

    /// Sets one value on the calling thread.
    pub fn put(key: &str, value: &str) {
        THREAD_CONTEXT.with(|ctx| {
            ctx.borrow_mut().insert(key.to_string(), value.to_string());
        });
    }

    /// Removes one value from the calling thread.
    pub fn remove(key: &str) -> Option<String> {
        THREAD_CONTEXT.with(|ctx| ctx.borrow_mut().remove(key))
    }

    /// Removes every value from the calling thread.
    pub fn clear() {
        THREAD_CONTEXT.with(|ctx| ctx.borrow_mut().clear());
    }

    /// Copies the calling thread's values.
    #[must_use]
    pub fn snapshot() -> RequestContext {
        THREAD_CONTEXT.with(|ctx| RequestContext::from(ctx.borrow().clone()))
    }
}

impl ContextSource for ThreadContext {
    fn get(&self, key: &str) -> Option<String> {
        THREAD_CONTEXT.with(|ctx| ctx.borrow().get(key).cloned())
    }

    fn contains_key(&self, key: &str) -> bool {
        THREAD_CONTEXT.with(|ctx| ctx.borrow().contains_key(key))
    }
}

/// Restores the previous thread context when dropped.
///
/// Bound to the thread that created it.
#[derive(Debug)]
pub struct ContextGuard {
    previous: Option<BTreeMap<String, String>>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            THREAD_CONTEXT.with(|ctx| {
                ctx.replace(previous);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_context_lookup() {
        let ctx: RequestContext = [("userId", "42"), ("loginId", "jdoe")].into_iter().collect();
        assert_eq!(ctx.get("userId").as_deref(), Some("42"));
        assert!(ctx.contains_key("loginId"));
        assert!(!ctx.contains_key("accountNumber"));
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_scopes_nest_and_restore() {
        ThreadContext::clear();
        ThreadContext::put("outer", "1");
        {
            let _outer = ThreadContext::scope(RequestContext::new().with("a", "1"));
            {
                let _inner = ThreadContext::scope(RequestContext::new().with("b", "2"));
                assert!(ThreadContext.contains_key("b"));
                assert!(!ThreadContext.contains_key("a"));
            }
            assert!(ThreadContext.contains_key("a"));
            assert!(!ThreadContext.contains_key("b"));
        }
        assert_eq!(ThreadContext.get("outer").as_deref(), Some("1"));
        ThreadContext::clear();
    }

    #[test]
    fn test_context_is_per_thread() {
        let _guard = ThreadContext::scope(RequestContext::new().with("userId", "42"));
        let seen = std::thread::spawn(|| ThreadContext.contains_key("userId"))
            .join()
            .unwrap();
        assert!(!seen);
        assert_eq!(ThreadContext::snapshot().len(), 1);
    }
}
