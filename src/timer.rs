//! Timer service consumed by the timed generators

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{interval_at, sleep, Instant};

use crate::emitter::Release;
use crate::error::{StreamError, StreamResult};
use crate::stream_configuration::TimerConfig;

/// One-shot timer callback
pub type OnceTask = Box<dyn FnOnce() + Send>;
/// Recurring timer callback
pub type RepeatingTask = Box<dyn FnMut() + Send>;

/// Schedules delayed and periodic callbacks.
///
/// The returned [`Release`] cancels the timer; once it has run the callback
/// is never invoked again.
pub trait TimerService: Send + Sync + 'static {
    /// Call `task` once after `delay`
    fn schedule_once(&self, delay: Duration, task: OnceTask) -> StreamResult<Release>;

    /// Call `task` every `period`, the first time one `period` from now
    fn schedule_repeating(&self, period: Duration, task: RepeatingTask) -> StreamResult<Release>;
}

/// [`TimerService`] backed by tokio tasks
#[derive(Debug, Clone, Default)]
pub struct TokioTimer {
    config: TimerConfig,
}

impl TokioTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TimerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    fn runtime() -> StreamResult<Handle> {
        Handle::try_current().map_err(|e| StreamError::NoRuntime(e.to_string()))
    }
}

impl TimerService for TokioTimer {
    fn schedule_once(&self, delay: Duration, task: OnceTask) -> StreamResult<Release> {
        let handle = Self::runtime()?.spawn(async move {
            sleep(delay).await;
            task();
        });
        log::debug!("scheduled one-shot timer after {:?}", delay);

        Ok(Release::new(move || {
            handle.abort();
            log::debug!("released one-shot timer");
        }))
    }

    fn schedule_repeating(&self, period: Duration, mut task: RepeatingTask) -> StreamResult<Release> {
        if !self.config.accepts(period) {
            return Err(StreamError::InvalidPeriod {
                period,
                minimum: self.config.min_period,
            });
        }

        let runtime = Self::runtime()?;
        let missed_ticks = self.config.missed_ticks.into();
        let handle = runtime.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(missed_ticks);
            loop {
                ticker.tick().await;
                task();
            }
        });
        log::debug!("scheduled repeating timer every {:?}", period);

        Ok(Release::new(move || {
            handle.abort();
            log::debug!("released repeating timer");
        }))
    }
}
