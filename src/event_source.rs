//! Event emitter contract and an in-process implementation

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Identifies one listener registration on an [`EventSource`]
pub type ListenerId = u64;

/// Listener invoked with the positional payload arguments of an event
pub type Listener<T> = Arc<dyn Fn(&[T]) + Send + Sync>;

/// Anything that can register and remove listeners for named events
pub trait EventSource<T>: Send + Sync {
    fn add_listener(&self, event: &str, listener: Listener<T>) -> ListenerId;

    /// Returns `false` if `id` was not registered for `event`
    fn remove_listener(&self, event: &str, id: ListenerId) -> bool;
}

impl<T, S> EventSource<T> for Arc<S>
where
    S: EventSource<T> + ?Sized,
{
    fn add_listener(&self, event: &str, listener: Listener<T>) -> ListenerId {
        (**self).add_listener(event, listener)
    }

    fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        (**self).remove_listener(event, id)
    }
}

struct HubInner<T> {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<String, Vec<(ListenerId, Listener<T>)>>>,
}

/// Named-event emitter shared by cloning.
///
/// Listeners run on the thread that calls [`EventHub::emit`], in
/// registration order.
pub struct EventHub<T> {
    inner: Arc<HubInner<T>>,
}

impl<T> Clone for EventHub<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for EventHub<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(HubInner {
                next_id: AtomicU64::new(0),
                listeners: Mutex::new(HashMap::new()),
            }),
        }
    }
}

impl<T> fmt::Debug for EventHub<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.lock();
        let counts: HashMap<&str, usize> = listeners
            .iter()
            .map(|(event, registered)| (event.as_str(), registered.len()))
            .collect();
        f.debug_struct("EventHub").field("listeners", &counts).finish()
    }
}

impl<T> EventHub<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<(ListenerId, Listener<T>)>>> {
        // Listeners never run under the lock, so a poisoned map is still consistent
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Invoke every listener of `event` with `args`; returns how many ran
    pub fn emit(&self, event: &str, args: &[T]) -> usize {
        let snapshot: Vec<Listener<T>> = self
            .lock()
            .get(event)
            .map(|registered| registered.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();

        for listener in &snapshot {
            listener(args);
        }
        log::trace!("emitted '{}' to {} listener(s)", event, snapshot.len());
        snapshot.len()
    }

    /// Emit an event with a single payload argument
    pub fn emit_value(&self, event: &str, value: T) -> usize {
        self.emit(event, std::slice::from_ref(&value))
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.lock().get(event).map_or(0, Vec::len)
    }
}

impl<T> EventSource<T> for EventHub<T> {
    fn add_listener(&self, event: &str, listener: Listener<T>) -> ListenerId {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock()
            .entry(event.to_owned())
            .or_default()
            .push((id, listener));
        id
    }

    fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let Some(registered) = listeners.get_mut(event) else {
            return false;
        };
        let before = registered.len();
        registered.retain(|(registered_id, _)| *registered_id != id);
        let removed = registered.len() != before;
        if registered.is_empty() {
            listeners.remove(event);
        }
        removed
    }
}
