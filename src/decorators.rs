//! Convention adapters
//!
//! Each factory takes a plain function written against one completion
//! convention and returns a decorated function with the same parameters
//! (minus any completion callback) that returns a [`DecoratedStream`]
//! instead. Parameters are passed as a single value: a tuple when the
//! wrapped function takes several, `()` when it takes none.
//!
//! The wrapped function always runs exactly once, at the moment the
//! decorated function is called.

use std::fmt;
use std::future::Future;

use futures::channel::oneshot;
use futures_util::future::FutureExt;
use futures_util::stream::StreamExt;

use crate::emitter::{sequence, single, DecoratedStream};
use crate::error::{StreamError, StreamResult};

/// Single-use completion callback handed to a wrapped function
pub struct Callback<T> {
    tx: oneshot::Sender<T>,
}

/// Error-first completion callback: `Err` is the error path, `Ok` the value path
pub type NodeCallback<O> = Callback<StreamResult<O>>;

impl<T> Callback<T> {
    fn channel() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        (Callback { tx }, rx)
    }

    /// Complete the call with `value`
    pub fn call(self, value: T) {
        if self.tx.send(value).is_err() {
            log::trace!("callback completed after its stream was dropped");
        }
    }

    /// Whether the stream waiting on this callback has been dropped
    pub fn is_canceled(&self) -> bool {
        self.tx.is_canceled()
    }
}

impl<O> Callback<StreamResult<O>> {
    pub fn resolve(self, value: O) {
        self.call(Ok(value));
    }

    pub fn reject(self, error: impl Into<StreamError>) {
        self.call(Err(error.into()));
    }

    /// Error-first completion: a present error wins over the value
    pub fn reply<E>(self, error: Option<E>, value: O)
    where
        E: Into<StreamError>,
    {
        match error {
            Some(error) => self.reject(error),
            None => self.resolve(value),
        }
    }
}

impl<T> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("canceled", &self.is_canceled())
            .finish()
    }
}

/// Decorate a function that completes through a single-argument callback.
///
/// Whatever the callback receives is a value; there is no error path. A
/// callback dropped without being called ends the stream with
/// [`StreamError::CallbackDropped`].
///
/// # Examples
/// ```
/// use stream_decorators::{callback, Callback};
/// use futures_util::stream::StreamExt;
///
/// # async fn example() {
/// let greet = callback(|(a, b): (&'static str, &'static str), done: Callback<String>| {
///     done.call(format!("{a} {b}"));
/// });
///
/// let result = greet(("Hello", "World")).collect::<Vec<_>>().await;
/// assert_eq!(result, vec![Ok("Hello World".to_string())]);
/// # }
/// ```
pub fn callback<A, O, F>(f: F) -> impl Fn(A) -> DecoratedStream<O> + Send + Sync
where
    O: Send + 'static,
    F: Fn(A, Callback<O>) + Send + Sync + 'static,
{
    move |args| {
        let (done, rx) = Callback::channel();
        f(args, done);
        rx.map(|received| received.map_err(StreamError::from))
            .into_stream()
            .boxed()
    }
}

/// Decorate a function that completes through an error-first callback
pub fn node_callback<A, O, F>(f: F) -> impl Fn(A) -> DecoratedStream<O> + Send + Sync
where
    O: Send + 'static,
    F: Fn(A, NodeCallback<O>) + Send + Sync + 'static,
{
    move |args| {
        let (done, rx) = Callback::channel();
        f(args, done);
        rx.map(|received| received.unwrap_or_else(|canceled| Err(canceled.into())))
            .into_stream()
            .boxed()
    }
}

/// Decorate a function that returns a future.
///
/// Fulfilment is the single value, rejection the single error.
pub fn promise<A, O, E, Fut, F>(f: F) -> impl Fn(A) -> DecoratedStream<O> + Send + Sync
where
    O: Send + 'static,
    E: Into<StreamError> + 'static,
    Fut: Future<Output = Result<O, E>> + Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
{
    move |args| settle(f(args))
}

/// Decorate a function that returns its result synchronously
pub fn value<A, O, E, F>(f: F) -> impl Fn(A) -> DecoratedStream<O> + Send + Sync
where
    O: Send + 'static,
    E: Into<StreamError>,
    F: Fn(A) -> Result<O, E> + Send + Sync + 'static,
{
    move |args| single(f(args).map_err(Into::into))
}

/// Decorate a function that returns a sequence; each element is one emission
///
/// # Examples
/// ```
/// use stream_decorators::array;
/// use futures_util::stream::StreamExt;
/// use std::convert::Infallible;
///
/// # async fn example() {
/// let pair = array(|(a, b): (i32, i32)| Ok::<_, Infallible>(vec![a, b]));
///
/// let result = pair((1, 22)).collect::<Vec<_>>().await;
/// assert_eq!(result, vec![Ok(1), Ok(22)]);
/// # }
/// ```
pub fn array<A, O, I, E, F>(f: F) -> impl Fn(A) -> DecoratedStream<O> + Send + Sync
where
    O: Send + 'static,
    I: IntoIterator<Item = O>,
    E: Into<StreamError>,
    F: Fn(A) -> Result<I, E> + Send + Sync + 'static,
{
    move |args| match f(args) {
        Ok(items) => sequence(items),
        Err(error) => single(Err(error.into())),
    }
}

/// Turn an already-obtained future into a one-item stream
pub(crate) fn settle<O, E, Fut>(fut: Fut) -> DecoratedStream<O>
where
    O: Send + 'static,
    E: Into<StreamError> + 'static,
    Fut: Future<Output = Result<O, E>> + Send + 'static,
{
    fut.map(|settled| settled.map_err(Into::into))
        .into_stream()
        .boxed()
}
