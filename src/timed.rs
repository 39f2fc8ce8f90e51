//! Timer driven stream generators
//!
//! The [`TimerService`] decides when values are pushed; the wrapped function
//! only decides what. Timers are armed on the first poll of the stream and
//! cancelled as soon as the stream completes, fails or is dropped.
//!
//! | Generator | Wrapped fn runs | Emits | Ends |
//! |---|---|---|---|
//! | [`interval`] | once, at call time | the value now, then every `period` | never |
//! | [`repeatedly`] | once, at call time | `S[0]` now, then the next element every `period`, cycling | never |
//! | [`sequentially`] | once, at call time | `S[0]` now, `S[i]` after `i` periods | after the last element |
//! | [`later`] | once, at call time | the value after `period` | right after |
//! | [`poll`] | on every tick | each fresh result, from the first tick | never |

use std::sync::Arc;
use std::time::Duration;

use crate::emitter::{from_emitter, sequence, single, DecoratedStream, Emitter, Release};
use crate::error::{StreamError, StreamResult};
use crate::stream_configuration::TimerConfig;
use crate::timer::{TimerService, TokioTimer};

/// Timed generator factories bound to a [`TimerService`]
#[derive(Debug, Clone, Default)]
pub struct Timed<T = TokioTimer> {
    timer: T,
}

impl Timed<TokioTimer> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TimerConfig) -> Self {
        Self::with_timer(TokioTimer::with_config(config))
    }
}

/// Hand out the timer's release, or fail the stream if it could not be armed
fn arm<O>(emitter: &Emitter<O>, scheduled: StreamResult<Release>) -> Release {
    scheduled.unwrap_or_else(|error| {
        log::debug!("timer could not be scheduled: {}", error);
        emitter.push_error(error);
        Release::noop()
    })
}

impl<T> Timed<T>
where
    T: TimerService + Clone,
{
    pub fn with_timer(timer: T) -> Self {
        Self { timer }
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Emit `f(args)` at subscribe time and again every `period`
    pub fn interval<A, O, E, F>(&self, period: Duration, f: F) -> impl Fn(A) -> DecoratedStream<O> + Send + Sync
    where
        O: Clone + Send + 'static,
        E: Into<StreamError>,
        F: Fn(A) -> Result<O, E> + Send + Sync + 'static,
    {
        let timer = self.timer.clone();
        move |args| match f(args) {
            Ok(value) => {
                let timer = timer.clone();
                from_emitter(move |emitter| {
                    emitter.push(value.clone());
                    let tick = emitter.clone();
                    arm(
                        &emitter,
                        timer.schedule_repeating(
                            period,
                            Box::new(move || {
                                tick.push(value.clone());
                            }),
                        ),
                    )
                })
            }
            Err(error) => single(Err(error.into())),
        }
    }

    /// Emit the elements of `f(args)` one per `period`, cycling back to the
    /// first after the last
    pub fn repeatedly<A, O, I, E, F>(&self, period: Duration, f: F) -> impl Fn(A) -> DecoratedStream<O> + Send + Sync
    where
        O: Clone + Send + 'static,
        I: IntoIterator<Item = O>,
        E: Into<StreamError>,
        F: Fn(A) -> Result<I, E> + Send + Sync + 'static,
    {
        let timer = self.timer.clone();
        move |args| {
            let items: Vec<O> = match f(args) {
                Ok(items) => items.into_iter().collect(),
                Err(error) => return single(Err(error.into())),
            };
            if items.is_empty() {
                return sequence(items);
            }

            let timer = timer.clone();
            from_emitter(move |emitter| {
                emitter.push(items[0].clone());
                let tick = emitter.clone();
                let mut next = 1 % items.len();
                arm(
                    &emitter,
                    timer.schedule_repeating(
                        period,
                        Box::new(move || {
                            tick.push(items[next].clone());
                            next = (next + 1) % items.len();
                        }),
                    ),
                )
            })
        }
    }

    /// Emit the elements of `f(args)` one per `period`, then end
    pub fn sequentially<A, O, I, E, F>(&self, period: Duration, f: F) -> impl Fn(A) -> DecoratedStream<O> + Send + Sync
    where
        O: Send + 'static,
        I: IntoIterator<Item = O>,
        E: Into<StreamError>,
        F: Fn(A) -> Result<I, E> + Send + Sync + 'static,
    {
        let timer = self.timer.clone();
        move |args| {
            let items: Vec<O> = match f(args) {
                Ok(items) => items.into_iter().collect(),
                Err(error) => return single(Err(error.into())),
            };
            if items.len() <= 1 {
                return sequence(items);
            }

            let timer = timer.clone();
            from_emitter(move |emitter| {
                let mut pending = items.into_iter();
                if let Some(first) = pending.next() {
                    emitter.push(first);
                }
                let tick = emitter.clone();
                arm(
                    &emitter,
                    timer.schedule_repeating(
                        period,
                        Box::new(move || {
                            if let Some(item) = pending.next() {
                                tick.push(item);
                            }
                            if pending.len() == 0 {
                                tick.end();
                            }
                        }),
                    ),
                )
            })
        }
    }

    /// Emit `f(args)` once after `period`, then end.
    ///
    /// A sequence returned by `f` is emitted as one value.
    pub fn later<A, O, E, F>(&self, period: Duration, f: F) -> impl Fn(A) -> DecoratedStream<O> + Send + Sync
    where
        O: Send + 'static,
        E: Into<StreamError>,
        F: Fn(A) -> Result<O, E> + Send + Sync + 'static,
    {
        let timer = self.timer.clone();
        move |args| match f(args) {
            Ok(value) => {
                let timer = timer.clone();
                from_emitter(move |emitter| {
                    let fire = emitter.clone();
                    arm(
                        &emitter,
                        timer.schedule_once(
                            period,
                            Box::new(move || {
                                fire.push(value);
                                fire.end();
                            }),
                        ),
                    )
                })
            }
            Err(error) => single(Err(error.into())),
        }
    }

    /// Call `f(args)` on every tick and emit each result.
    ///
    /// The first call happens one `period` after subscription. An `Err`
    /// from any call ends the stream with that error.
    pub fn poll<A, O, E, F>(&self, period: Duration, f: F) -> impl Fn(A) -> DecoratedStream<O> + Send + Sync
    where
        A: Clone + Send + 'static,
        O: Send + 'static,
        E: Into<StreamError>,
        F: Fn(A) -> Result<O, E> + Send + Sync + 'static,
    {
        let timer = self.timer.clone();
        let f = Arc::new(f);
        move |args| {
            let timer = timer.clone();
            let f = Arc::clone(&f);
            from_emitter(move |emitter| {
                let tick = emitter.clone();
                arm(
                    &emitter,
                    timer.schedule_repeating(
                        period,
                        Box::new(move || match f(args.clone()) {
                            Ok(value) => {
                                tick.push(value);
                            }
                            Err(error) => {
                                tick.push_error(error.into());
                            }
                        }),
                    ),
                )
            })
        }
    }
}

/// [`Timed::interval`] on the default tokio timer
pub fn interval<A, O, E, F>(period: Duration, f: F) -> impl Fn(A) -> DecoratedStream<O> + Send + Sync
where
    O: Clone + Send + 'static,
    E: Into<StreamError>,
    F: Fn(A) -> Result<O, E> + Send + Sync + 'static,
{
    Timed::new().interval(period, f)
}

/// [`Timed::repeatedly`] on the default tokio timer
pub fn repeatedly<A, O, I, E, F>(period: Duration, f: F) -> impl Fn(A) -> DecoratedStream<O> + Send + Sync
where
    O: Clone + Send + 'static,
    I: IntoIterator<Item = O>,
    E: Into<StreamError>,
    F: Fn(A) -> Result<I, E> + Send + Sync + 'static,
{
    Timed::new().repeatedly(period, f)
}

/// [`Timed::sequentially`] on the default tokio timer
pub fn sequentially<A, O, I, E, F>(period: Duration, f: F) -> impl Fn(A) -> DecoratedStream<O> + Send + Sync
where
    O: Send + 'static,
    I: IntoIterator<Item = O>,
    E: Into<StreamError>,
    F: Fn(A) -> Result<I, E> + Send + Sync + 'static,
{
    Timed::new().sequentially(period, f)
}

/// [`Timed::later`] on the default tokio timer
pub fn later<A, O, E, F>(period: Duration, f: F) -> impl Fn(A) -> DecoratedStream<O> + Send + Sync
where
    O: Send + 'static,
    E: Into<StreamError>,
    F: Fn(A) -> Result<O, E> + Send + Sync + 'static,
{
    Timed::new().later(period, f)
}

/// [`Timed::poll`] on the default tokio timer
pub fn poll<A, O, E, F>(period: Duration, f: F) -> impl Fn(A) -> DecoratedStream<O> + Send + Sync
where
    A: Clone + Send + 'static,
    O: Send + 'static,
    E: Into<StreamError>,
    F: Fn(A) -> Result<O, E> + Send + Sync + 'static,
{
    Timed::new().poll(period, f)
}
