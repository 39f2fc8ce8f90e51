//! Decorators that turn functions written against any completion convention
//! into functions returning a [`DecoratedStream`].
//!
//! Callbacks, error-first callbacks, futures, plain values, sequences, event
//! sources and timers all end up behind the same contract: a cold stream of
//! `StreamResult<O>` items where an error is always the last item, and where
//! dropping the stream releases every timer and listener it acquired.

pub mod error;
pub mod stream_configuration;

pub mod emitter;
pub mod event_source;
pub mod timer;

pub mod auto;
pub mod decorators;
pub mod event;
pub mod subscription;
pub mod timed;

// Re-export the decorator factories at the crate root
pub use auto::{auto, auto_with, AutoOptions, Classify, Shape, ShapeKind};
pub use decorators::*;
pub use emitter::{from_emitter, DecoratedStream, Emitter, Release};
pub use error::{StreamError, StreamResult};
pub use event::{event, event_map, Transform};
pub use event_source::{EventHub, EventSource, Listener, ListenerId};
pub use stream_configuration::{MissedTicks, TimerConfig};
pub use subscription::{subscribe, Subscription};
pub use timed::{interval, later, poll, repeatedly, sequentially, Timed};
pub use timer::{TimerService, TokioTimer};
