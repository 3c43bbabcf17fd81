use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::thread::{self, ThreadId};

use crate::core::FilterError;
use crate::models::FilterCriteria;

type Listener = Arc<dyn Fn(&FilterCriteria) + Send + Sync>;

/// Handle returned by [`FilterState::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

/// Holder for the currently active filter criteria
///
/// Criteria are swapped as whole `Arc`s, so `get` never sees a partial
/// update. Writers are serialised: a `set` or `clear` holds the writer lock
/// until every listener has run, so listeners observe changes in commit order.
///
/// Listeners run on the writer's thread. They may call `get` but must not
/// call `set` or `clear` on the same state.
pub struct FilterState {
    current: RwLock<Arc<FilterCriteria>>,
    writer: Mutex<()>,
    listeners: Mutex<Listeners>,
    /// Thread currently running listeners, if any
    notifying: Mutex<Option<ThreadId>>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::with_criteria(FilterCriteria::default())
    }

    pub fn with_criteria(criteria: FilterCriteria) -> Self {
        Self {
            current: RwLock::new(Arc::new(criteria)),
            writer: Mutex::new(()),
            listeners: Mutex::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            }),
            notifying: Mutex::new(None),
        }
    }

    /// Current criteria snapshot
    pub fn get(&self) -> FilterCriteria {
        self.snapshot().as_ref().clone()
    }

    /// Current criteria as a shared pointer, without cloning the tag set
    pub fn snapshot(&self) -> Arc<FilterCriteria> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Replace the criteria and notify listeners
    ///
    /// Invalid criteria are rejected and leave the state untouched.
    ///
    /// # Panics
    ///
    /// Panics when called from one of this state's listeners.
    pub fn set(&self, criteria: FilterCriteria) -> Result<(), FilterError> {
        criteria.validate()?;
        self.replace(criteria);
        Ok(())
    }

    /// Reset to the identity criteria and notify listeners
    ///
    /// # Panics
    ///
    /// Panics when called from one of this state's listeners.
    pub fn clear(&self) {
        self.replace(FilterCriteria::default());
    }

    /// Register a listener, called after every `set`/`clear`
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&FilterCriteria) + Send + Sync + 'static,
    {
        let mut listeners = lock(&self.listeners);
        let id = SubscriptionId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener; returns false if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = lock(&self.listeners);
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry_id, _)| *entry_id != id);
        listeners.entries.len() != before
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).entries.len()
    }

    fn replace(&self, criteria: FilterCriteria) {
        // The writer lock is not reentrant; fail loudly instead of hanging
        if *lock(&self.notifying) == Some(thread::current().id()) {
            panic!("FilterState listeners must not call set or clear on the state notifying them");
        }

        let _writer = lock(&self.writer);

        let next = Arc::new(criteria);
        {
            let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
            *current = Arc::clone(&next);
        }

        // Copy the list out so listeners may subscribe or read without deadlocking
        let listeners: Vec<Listener> = lock(&self.listeners)
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        tracing::debug!(
            "Filter criteria replaced (radius: {:?}, tags: {}), notifying {} listeners",
            next.radius_km,
            next.tags.len(),
            listeners.len()
        );

        let _notifying = NotifyingGuard::enter(&self.notifying);
        for listener in listeners {
            listener(&next);
        }
    }
}

/// Marks the current thread as running listeners until dropped
struct NotifyingGuard<'a>(&'a Mutex<Option<ThreadId>>);

impl<'a> NotifyingGuard<'a> {
    fn enter(slot: &'a Mutex<Option<ThreadId>>) -> Self {
        *lock(slot) = Some(thread::current().id());
        Self(slot)
    }
}

impl Drop for NotifyingGuard<'_> {
    fn drop(&mut self) {
        *lock(self.0) = None;
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FilterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterState")
            .field("current", &self.snapshot())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_starts_unconstrained() {
        let state = FilterState::new();
        assert!(state.get().is_unconstrained());
    }

    #[test]
    fn test_set_and_clear() {
        let state = FilterState::new();
        state.set(FilterCriteria::new(Some(25.0), ["Italian"])).unwrap();

        let current = state.get();
        assert_eq!(current.radius_km, Some(25.0));
        assert!(current.tags.contains("Italian"));

        state.clear();
        assert_eq!(state.get(), FilterCriteria::default());
    }

    #[test]
    fn test_invalid_set_leaves_state() {
        let state = FilterState::new();
        state.set(FilterCriteria::new(Some(10.0), Vec::<String>::new())).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        state.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let err = state.set(FilterCriteria::new(Some(-1.0), Vec::<String>::new()));
        assert!(err.is_err());
        assert_eq!(state.get().radius_km, Some(10.0));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_listeners_run_in_registration_order() {
        let state = FilterState::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            state.subscribe(move |criteria| {
                log.lock().unwrap().push((name, criteria.radius_km));
            });
        }

        state.set(FilterCriteria::new(Some(5.0), Vec::<String>::new())).unwrap();
        state.clear();

        let log = log.lock().unwrap();
        assert_eq!(
            *log,
            vec![
                ("first", Some(5.0)),
                ("second", Some(5.0)),
                ("third", Some(5.0)),
                ("first", None),
                ("second", None),
                ("third", None),
            ]
        );
    }

    #[test]
    fn test_listener_sees_committed_value() {
        let state = Arc::new(FilterState::new());
        let observed = Arc::new(Mutex::new(None));

        let reader = Arc::clone(&state);
        let sink = Arc::clone(&observed);
        state.subscribe(move |_| {
            *sink.lock().unwrap() = Some(reader.get());
        });

        let criteria = FilterCriteria::new(Some(42.0), ["Hindi"]);
        state.set(criteria.clone()).unwrap();

        assert_eq!(observed.lock().unwrap().as_ref(), Some(&criteria));
    }

    #[test]
    fn test_unsubscribe() {
        let state = FilterState::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let id = state.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        state.clear();
        assert!(state.unsubscribe(id));
        assert!(!state.unsubscribe(id));
        state.clear();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.listener_count(), 0);
    }

    #[test]
    #[should_panic(expected = "must not call set or clear")]
    fn test_listener_writing_state_panics() {
        let state = Arc::new(FilterState::new());
        let writer = Arc::clone(&state);
        state.subscribe(move |_| writer.clear());

        state.set(FilterCriteria::new(Some(3.0), Vec::<String>::new())).unwrap();
    }

    #[test]
    fn test_writes_allowed_after_listeners_return() {
        let state = Arc::new(FilterState::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        state.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        state.set(FilterCriteria::new(Some(3.0), Vec::<String>::new())).unwrap();
        state.clear();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(state.get().is_unconstrained());
    }

    #[test]
    fn test_concurrent_readers_see_whole_values() {
        let state = Arc::new(FilterState::new());
        let a = FilterCriteria::new(Some(1.0), ["A"]);
        let b = FilterCriteria::new(Some(2.0), ["B"]);

        let writer = {
            let state = Arc::clone(&state);
            let (a, b) = (a.clone(), b.clone());
            std::thread::spawn(move || {
                for i in 0..500 {
                    let next = if i % 2 == 0 { a.clone() } else { b.clone() };
                    state.set(next).unwrap();
                }
            })
        };

        for _ in 0..500 {
            let seen = state.get();
            assert!(seen == a || seen == b || seen.is_unconstrained());
        }

        writer.join().unwrap();
    }
}
