use std::time::{Duration, Instant};

use log::debug;

use crate::error::ClockError;

const NANOS_PER_SECOND: f64 = 1e9;

/// A monotonic timestamp source.
pub type TimeSource = Box<dyn Fn() -> Duration>;

/// A task run against some context `C` whenever its period has elapsed.
pub type Task<C, E> = Box<dyn FnMut(&mut C) -> Result<(), E>>;

struct PeriodicTask<C, E> {
    task: Task<C, E>,
    period: Duration,
    last_fired: Duration,
}

/// A time source counting from the moment it was created.
pub fn monotonic() -> TimeSource {
    let start = Instant::now();
    Box::new(move || start.elapsed())
}

/// # Clock
/// Runs registered tasks at fixed frequencies.
///
/// The clock never sleeps or spawns anything. The host calls `tick` as often
/// as it likes and each task whose period has elapsed since it last fired
/// runs once, in registration order.
///
/// Missed periods are not caught up: a task fires at most once per `tick`
/// however late the call is.
pub struct Clock<C, E> {
    now: Option<TimeSource>,
    tasks: Vec<PeriodicTask<C, E>>,
}

impl<C, E> Clock<C, E> {
    pub fn new(now: TimeSource) -> Self {
        Clock {
            now: Some(now),
            tasks: Vec::new(),
        }
    }

    /// A clock with no time source; registration always fails.
    pub fn without_time_source() -> Self {
        Clock {
            now: None,
            tasks: Vec::new(),
        }
    }

    /// Schedules `task` to run every `1 / frequency` seconds, counting from now.
    ///
    /// # Arguments
    /// * `task` the work to run against the context passed to `tick`
    /// * `frequency` how often to run it, in Hz
    pub fn register(&mut self, task: Task<C, E>, frequency: f64) -> Result<(), ClockError> {
        let now = self.now.as_ref().ok_or(ClockError::MissingTimeSource)?;
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(ClockError::InvalidFrequency(frequency));
        }
        let period = Duration::from_nanos((NANOS_PER_SECOND / frequency) as u64);
        debug!("registered task #{} every {:?}", self.tasks.len(), period);
        self.tasks.push(PeriodicTask {
            task,
            period,
            last_fired: now(),
        });
        Ok(())
    }

    /// Runs every task that is due, reading the time source once.
    ///
    /// Stops at the first task that fails and returns its error; the tasks
    /// after it are left for the next tick.
    pub fn tick(&mut self, context: &mut C) -> Result<(), E> {
        let now = match &self.now {
            Some(now) => now,
            None => return Ok(()),
        };
        let current = now();
        for periodic in self.tasks.iter_mut() {
            if current.saturating_sub(periodic.last_fired) >= periodic.period {
                periodic.last_fired = current;
                (periodic.task)(context)?;
            }
        }
        Ok(())
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}
