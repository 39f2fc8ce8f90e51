//! Stream construction from emitter callbacks
//!
//! [`from_emitter`] is the single constructor every timed generator and the
//! event adapter go through. The emitter callback runs on the first poll of
//! the stream and hands back a [`Release`]; the release runs exactly once,
//! when the stream observes its terminal item or is dropped, whichever comes
//! first.

use std::fmt;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_stream::stream;
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures_core::Stream;
use futures_util::stream::{BoxStream, StreamExt};

use crate::error::{StreamError, StreamResult};

/// The stream every decorated function returns
pub type DecoratedStream<O> = BoxStream<'static, StreamResult<O>>;

/// Idempotent cleanup owned by a single subscription.
///
/// The wrapped closure runs at most once: on [`Release::run`] or on drop.
#[must_use = "dropping a Release runs it immediately"]
pub struct Release(Option<Box<dyn FnOnce() + Send>>);

impl Release {
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Release(Some(Box::new(release)))
    }

    /// A release with nothing to clean up
    pub fn noop() -> Self {
        Release(None)
    }

    pub fn run(&mut self) {
        if let Some(release) = self.0.take() {
            release();
        }
    }

    pub fn is_spent(&self) -> bool {
        self.0.is_none()
    }
}

impl Drop for Release {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Release")
            .field("spent", &self.is_spent())
            .finish()
    }
}

/// Push side of a stream built with [`from_emitter`].
///
/// Cloneable and usable from any thread. Every method is a no-op once the
/// stream has ended, failed or been dropped.
pub struct Emitter<O> {
    tx: UnboundedSender<StreamResult<O>>,
}

impl<O> Clone for Emitter<O> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<O> fmt::Debug for Emitter<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<O> Emitter<O> {
    /// Push a value. Returns `false` if nobody can observe it anymore.
    pub fn push(&self, value: O) -> bool {
        let delivered = self.tx.unbounded_send(Ok(value)).is_ok();
        if !delivered {
            log::trace!("dropping value pushed into a closed stream");
        }
        delivered
    }

    /// Push the terminal error and close the stream
    pub fn push_error(&self, error: StreamError) -> bool {
        let delivered = self.tx.unbounded_send(Err(error)).is_ok();
        self.tx.close_channel();
        delivered
    }

    /// End the stream after everything already pushed
    pub fn end(&self) {
        self.tx.close_channel();
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

type Subscribe<O> = Box<dyn FnOnce(Emitter<O>) -> Release + Send>;

enum State<O> {
    Idle(Subscribe<O>),
    Active {
        rx: UnboundedReceiver<StreamResult<O>>,
        // Dropped together with the receiver when the state moves on
        _release: Release,
    },
    Done,
}

/// Cold stream driven by an emitter callback
pub struct EmitterStream<O> {
    state: State<O>,
}

impl<O> Unpin for EmitterStream<O> {}

impl<O> EmitterStream<O> {
    fn activate(&mut self) {
        if let State::Idle(_) = self.state {
            if let State::Idle(subscribe) = mem::replace(&mut self.state, State::Done) {
                let (tx, rx) = unbounded();
                let release = subscribe(Emitter { tx });
                self.state = State::Active {
                    rx,
                    _release: release,
                };
            }
        }
    }
}

impl<O> Stream for EmitterStream<O> {
    type Item = StreamResult<O>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        this.activate();

        let polled = match &mut this.state {
            State::Active { rx, .. } => rx.poll_next_unpin(cx),
            _ => return Poll::Ready(None),
        };

        match polled {
            Poll::Ready(Some(Ok(value))) => Poll::Ready(Some(Ok(value))),
            Poll::Ready(Some(Err(error))) => {
                this.state = State::Done;
                Poll::Ready(Some(Err(error)))
            }
            Poll::Ready(None) => {
                this.state = State::Done;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Build a cold stream from an emitter callback.
///
/// # Examples
/// ```
/// use stream_decorators::emitter::{from_emitter, Release};
/// use futures_util::stream::StreamExt;
///
/// # async fn example() {
/// let stream = from_emitter(|emitter| {
///     emitter.push(1);
///     emitter.push(2);
///     emitter.end();
///     Release::noop()
/// });
///
/// let result = stream.collect::<Vec<_>>().await;
/// assert_eq!(result, vec![Ok(1), Ok(2)]);
/// # }
/// ```
pub fn from_emitter<O, F>(subscribe: F) -> DecoratedStream<O>
where
    O: Send + 'static,
    F: FnOnce(Emitter<O>) -> Release + Send + 'static,
{
    EmitterStream {
        state: State::Idle(Box::new(subscribe)),
    }
    .boxed()
}

/// A stream with exactly one item
pub(crate) fn single<O>(item: StreamResult<O>) -> DecoratedStream<O>
where
    O: Send + 'static,
{
    futures_util::stream::once(futures_util::future::ready(item)).boxed()
}

/// Every element in order, then end
pub(crate) fn sequence<O, I>(items: I) -> DecoratedStream<O>
where
    O: Send + 'static,
    I: IntoIterator<Item = O>,
{
    let items: Vec<O> = items.into_iter().collect();
    stream! {
        for item in items {
            yield Ok(item);
        }
    }
    .boxed()
}
