//! Event adapter: re-emit occurrences of a named event as stream values

use std::sync::Arc;

use crate::emitter::{from_emitter, DecoratedStream, Emitter, Release};
use crate::event_source::{EventSource, Listener};

/// Payload transform applied to each event occurrence
pub type Transform<T> = Arc<dyn Fn(T) -> T + Send + Sync>;

pub(crate) fn identity_or<T>(transform: Option<Transform<T>>) -> Transform<T>
where
    T: 'static,
{
    transform.unwrap_or_else(|| Arc::new(|payload: T| payload))
}

/// Decorate a function that returns an event source.
///
/// Every occurrence of `name` pushes its first payload argument, passed
/// through `transform` when one is given. The stream never ends on its own;
/// dropping it removes the listener.
///
/// # Examples
/// ```
/// use stream_decorators::{event, EventHub, Transform};
/// use std::sync::Arc;
///
/// let hub = EventHub::<i32>::new();
/// let source = hub.clone();
/// let double: Transform<i32> = Arc::new(|x| x * 2);
/// let doubled = event(move |_: ()| source.clone(), "data", Some(double));
/// let stream = doubled(());
/// # drop(stream);
/// ```
pub fn event<A, T, M, F>(
    f: F,
    name: impl Into<String>,
    transform: Option<Transform<T>>,
) -> impl Fn(A) -> DecoratedStream<T> + Send + Sync
where
    T: Clone + Send + 'static,
    M: EventSource<T> + 'static,
    F: Fn(A) -> M + Send + Sync + 'static,
{
    let transform = identity_or(transform);
    event_map(f, name, move |payload| transform(payload))
}

/// Like [`event`], with a transform that may change the payload type
pub fn event_map<A, T, O, M, F, G>(
    f: F,
    name: impl Into<String>,
    map: G,
) -> impl Fn(A) -> DecoratedStream<O> + Send + Sync
where
    T: Clone + Send + 'static,
    O: Send + 'static,
    M: EventSource<T> + 'static,
    F: Fn(A) -> M + Send + Sync + 'static,
    G: Fn(T) -> O + Send + Sync + 'static,
{
    let name = name.into();
    let map = Arc::new(map);
    move |args| listen(Arc::new(f(args)), name.clone(), Arc::clone(&map))
}

/// Stream the occurrences of `event` on an already-obtained source
pub(crate) fn listen<T, O, S, G>(source: Arc<S>, event: String, map: Arc<G>) -> DecoratedStream<O>
where
    T: Clone + Send + 'static,
    O: Send + 'static,
    S: EventSource<T> + ?Sized + 'static,
    G: Fn(T) -> O + Send + Sync + ?Sized + 'static,
{
    from_emitter(move |emitter: Emitter<O>| {
        let listener: Listener<T> = Arc::new(move |args: &[T]| {
            if let Some(payload) = args.first() {
                emitter.push(map(payload.clone()));
            }
        });
        let id = source.add_listener(&event, listener);
        log::debug!("listening for '{}' as listener {}", event, id);

        Release::new(move || {
            if source.remove_listener(&event, id) {
                log::debug!("removed listener {} for '{}'", id, event);
            }
        })
    })
}
