//! Auto adapter: pick the convention from what the wrapped function returns
//!
//! The wrapped function runs once per call. Its return value is classified
//! into a [`Shape`] and the stream is built from that already-obtained
//! value; no branch ever calls the function a second time.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use crate::decorators::settle;
use crate::emitter::{sequence, single, DecoratedStream};
use crate::error::{StreamError, StreamResult};
use crate::event::{identity_or, listen, Transform};
use crate::event_source::{EventHub, EventSource};

/// The closed set of return shapes the auto adapter recognises.
///
/// Dispatch precedence, first match wins:
/// 1. [`Shape::Promise`] settles like [`promise`](crate::promise)
/// 2. [`Shape::Sequence`] emits like [`array`](crate::array)
/// 3. [`Shape::Emitter`] listens like [`event`](crate::event), but only
///    when an event name was configured
/// 4. anything else is a single value
///
/// [`Shape::Failed`] carries an error the function returned and becomes the
/// stream's terminal error.
pub enum Shape<O> {
    Promise(BoxFuture<'static, StreamResult<O>>),
    Sequence(Vec<O>),
    Emitter(Arc<dyn EventSource<O>>),
    Value(O),
    Failed(StreamError),
}

/// Discriminant of a [`Shape`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Promise,
    Sequence,
    Emitter,
    Value,
    Failed,
}

impl<O> Shape<O> {
    pub fn promise<Fut, E>(fut: Fut) -> Self
    where
        Fut: Future<Output = Result<O, E>> + Send + 'static,
        E: Into<StreamError> + 'static,
    {
        Shape::Promise(fut.map(|settled| settled.map_err(Into::into)).boxed())
    }

    pub fn sequence(items: impl IntoIterator<Item = O>) -> Self {
        Shape::Sequence(items.into_iter().collect())
    }

    pub fn emitter(source: impl EventSource<O> + 'static) -> Self {
        Shape::Emitter(Arc::new(source))
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Promise(_) => ShapeKind::Promise,
            Shape::Sequence(_) => ShapeKind::Sequence,
            Shape::Emitter(_) => ShapeKind::Emitter,
            Shape::Value(_) => ShapeKind::Value,
            Shape::Failed(_) => ShapeKind::Failed,
        }
    }
}

impl<O> fmt::Debug for Shape<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shape").field(&self.kind()).finish()
    }
}

/// Classification of a wrapped function's return value
pub trait Classify {
    /// Item type of the resulting stream
    type Output;

    fn classify(self) -> Shape<Self::Output>;
}

impl<O> Classify for Shape<O> {
    type Output = O;

    fn classify(self) -> Shape<O> {
        self
    }
}

impl<O> Classify for Vec<O> {
    type Output = O;

    fn classify(self) -> Shape<O> {
        Shape::Sequence(self)
    }
}

impl<O, const N: usize> Classify for [O; N] {
    type Output = O;

    fn classify(self) -> Shape<O> {
        Shape::Sequence(Vec::from(self))
    }
}

impl<O> Classify for BoxFuture<'static, StreamResult<O>> {
    type Output = O;

    fn classify(self) -> Shape<O> {
        Shape::Promise(self)
    }
}

impl<O> Classify for EventHub<O>
where
    O: 'static,
{
    type Output = O;

    fn classify(self) -> Shape<O> {
        Shape::Emitter(Arc::new(self))
    }
}

impl<T, E> Classify for Result<T, E>
where
    T: Classify,
    E: Into<StreamError>,
{
    type Output = T::Output;

    fn classify(self) -> Shape<T::Output> {
        match self {
            Ok(produced) => produced.classify(),
            Err(error) => Shape::Failed(error.into()),
        }
    }
}

macro_rules! classify_as_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Classify for $ty {
                type Output = $ty;

                fn classify(self) -> Shape<$ty> {
                    Shape::Value(self)
                }
            }
        )*
    };
}

classify_as_value!(
    (), bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    String, &'static str,
);

/// Optional event name and transform for [`auto_with`]
pub struct AutoOptions<O> {
    event: Option<String>,
    transform: Option<Transform<O>>,
}

impl<O> Default for AutoOptions<O> {
    fn default() -> Self {
        Self {
            event: None,
            transform: None,
        }
    }
}

impl<O> Clone for AutoOptions<O> {
    fn clone(&self) -> Self {
        Self {
            event: self.event.clone(),
            transform: self.transform.clone(),
        }
    }
}

impl<O> fmt::Debug for AutoOptions<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoOptions")
            .field("event", &self.event)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

impl<O> AutoOptions<O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Event to listen for when the function returns an event source
    pub fn event(mut self, name: impl Into<String>) -> Self {
        self.event = Some(name.into());
        self
    }

    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(O) -> O + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn event_name(&self) -> Option<&str> {
        self.event.as_deref()
    }
}

/// Decorate a function whose convention is decided by what it returns.
///
/// An event source returned without an event name configured (always the
/// case here; see [`auto_with`]) cannot be emitted as a value of the stream,
/// so the stream ends without emitting anything and a warning is logged.
///
/// # Examples
/// ```
/// use stream_decorators::auto;
/// use futures_util::stream::StreamExt;
///
/// # async fn example() {
/// let sum = auto(|(a, b): (i32, i32)| a + b);
/// assert_eq!(sum((1, 22)).collect::<Vec<_>>().await, vec![Ok(23)]);
///
/// let pair = auto(|(a, b): (i32, i32)| vec![a, b]);
/// assert_eq!(pair((1, 22)).collect::<Vec<_>>().await, vec![Ok(1), Ok(22)]);
/// # }
/// ```
pub fn auto<A, R, F>(f: F) -> impl Fn(A) -> DecoratedStream<R::Output> + Send + Sync
where
    R: Classify,
    R::Output: Clone + Send + 'static,
    F: Fn(A) -> R + Send + Sync + 'static,
{
    auto_with(f, AutoOptions::default())
}

/// [`auto`] with an event name and transform for event-source returns.
///
/// When `options` carries no event name, a returned event source ends the
/// stream immediately with no values, since the source itself has no
/// representation as a stream item.
pub fn auto_with<A, R, F>(
    f: F,
    options: AutoOptions<R::Output>,
) -> impl Fn(A) -> DecoratedStream<R::Output> + Send + Sync
where
    R: Classify,
    R::Output: Clone + Send + 'static,
    F: Fn(A) -> R + Send + Sync + 'static,
{
    move |args| dispatch(f(args).classify(), &options)
}

fn dispatch<O>(shape: Shape<O>, options: &AutoOptions<O>) -> DecoratedStream<O>
where
    O: Clone + Send + 'static,
{
    match shape {
        Shape::Promise(fut) => settle(fut),
        Shape::Sequence(items) => sequence(items),
        Shape::Emitter(source) => match &options.event {
            Some(event) => listen(source, event.clone(), identity_or(options.transform.clone())),
            None => {
                // Nothing to listen for: the source itself is the value, and it
                // has no representation as an item of this stream.
                log::warn!("auto adapter got an event source but no event name; ending without values");
                sequence(Vec::new())
            }
        },
        Shape::Value(value) => single(Ok(value)),
        Shape::Failed(error) => single(Err(error)),
    }
}
