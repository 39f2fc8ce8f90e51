//! Callback-style consumption of decorated streams

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::thread::{self, ThreadId};

use futures::stream::{abortable, AbortHandle};
use futures::task::noop_waker_ref;
use futures_core::Stream;
use futures_util::stream::StreamExt;
use tokio::task::JoinHandle;

use crate::error::{StreamError, StreamResult};

/// Serialises callback delivery against [`Subscription::unsubscribe`]
#[derive(Debug, Default)]
struct Gate {
    stopped: AtomicBool,
    delivery: Mutex<()>,
    // Thread currently inside a callback, so unsubscribing from that
    // callback does not wait on itself
    delivering: Mutex<Option<ThreadId>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking callback leaves nothing half-written behind these locks
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Gate {
    /// Run `deliver` unless the subscription was stopped. Returns `false` if
    /// it was stopped.
    fn deliver(&self, deliver: impl FnOnce()) -> bool {
        let _delivery = lock(&self.delivery);
        if self.stopped.load(Ordering::Acquire) {
            return false;
        }
        *lock(&self.delivering) = Some(thread::current().id());
        deliver();
        *lock(&self.delivering) = None;
        true
    }

    /// Stop delivery, waiting out a callback running on another thread
    fn close(&self) {
        self.stopped.store(true, Ordering::Release);
        if *lock(&self.delivering) == Some(thread::current().id()) {
            return;
        }
        drop(lock(&self.delivery));
    }

    fn is_closed(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// Hand one item to the callbacks. Returns whether delivery continues.
fn dispatch<O, V, R>(gate: &Gate, item: StreamResult<O>, on_value: &mut V, on_error: &mut R) -> bool
where
    V: FnMut(O),
    R: FnMut(StreamError),
{
    match item {
        Ok(value) => gate.deliver(|| on_value(value)),
        Err(error) => {
            gate.deliver(|| on_error(error));
            false
        }
    }
}

/// A running subscription started by [`subscribe`]
#[derive(Debug)]
pub struct Subscription {
    gate: Arc<Gate>,
    abort: AbortHandle,
    task: JoinHandle<()>,
}

impl Subscription {
    /// Stop delivery. Idempotent; once this returns no callback runs again.
    ///
    /// A callback already running on another thread is waited for. Calling
    /// this from inside `on_value` or `on_error` is allowed and stops delivery
    /// after that callback returns.
    ///
    /// The stream itself, with any timer or listener it holds, is dropped by
    /// the driving task right after.
    pub fn unsubscribe(&self) {
        self.gate.close();
        self.abort.abort();
    }

    pub fn is_unsubscribed(&self) -> bool {
        self.gate.is_closed()
    }

    /// Whether the driving task has finished
    pub fn is_closed(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the stream completed, failed or was unsubscribed
    pub async fn closed(self) {
        if let Err(e) = self.task.await {
            log::warn!("subscription task ended abnormally: {}", e);
        }
    }
}

/// Drive `stream` on the current tokio runtime, calling `on_value` for each
/// value and `on_error` for the terminal error.
///
/// The stream is subscribed before this returns: its listeners are attached,
/// its timers armed, and any items it can produce right away (such as the
/// first value of an [`interval`](crate::interval)) have already been handed
/// to `on_value` on the calling thread. Everything after that is delivered
/// from a spawned task.
///
/// # Panics
/// Panics when called outside of a tokio runtime.
pub fn subscribe<O, S, V, R>(stream: S, mut on_value: V, mut on_error: R) -> Subscription
where
    O: Send + 'static,
    S: Stream<Item = StreamResult<O>> + Send + 'static,
    V: FnMut(O) + Send + 'static,
    R: FnMut(StreamError) + Send + 'static,
{
    let gate = Arc::new(Gate::default());
    let mut stream = stream.boxed();

    // The driving task registers a real waker on its first poll
    let mut cx = Context::from_waker(noop_waker_ref());
    let mut finished = false;
    while let Poll::Ready(item) = stream.poll_next_unpin(&mut cx) {
        let more = match item {
            Some(item) => dispatch(&gate, item, &mut on_value, &mut on_error),
            None => false,
        };
        if !more {
            finished = true;
            break;
        }
    }

    let (mut stream, abort) = abortable(stream);
    let driver = Arc::clone(&gate);
    let task = tokio::spawn(async move {
        if !finished {
            while let Some(item) = stream.next().await {
                if !dispatch(&driver, item, &mut on_value, &mut on_error) {
                    break;
                }
            }
        }
        log::debug!("subscription finished");
    });

    Subscription { gate, abort, task }
}
