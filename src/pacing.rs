//! Minimum spacing between translation calls, and run interruption.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Default minimum interval between two translation calls.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(250);

/// Shared interruption flag.
///
/// Cloning hands out another handle to the same flag. Observing the flag
/// does not clear it, so whoever supervises the run still sees the request
/// after the pipeline has returned [`Error::Interrupted`].
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request interruption.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// `Err(Error::Interrupted)` once triggered.
    pub fn check(&self) -> Result<()> {
        if self.is_triggered() {
            Err(Error::Interrupted)
        } else {
            Ok(())
        }
    }
}

/// Something that can block the current thread for a while.
pub trait Sleeper {
    /// Sleep for `duration`, returning early with [`Error::Interrupted`]
    /// if `interrupt` is triggered.
    fn sleep(&self, duration: Duration, interrupt: &Interrupt) -> Result<()>;
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self, duration: Duration, interrupt: &Interrupt) -> Result<()> {
        (**self).sleep(duration, interrupt)
    }
}

/// Sleeps on the current thread, polling the interrupt flag.
#[derive(Debug, Clone, Copy)]
pub struct ThreadSleeper {
    poll: Duration,
}

impl ThreadSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how often the interrupt flag is polled while sleeping.
    pub fn with_poll_interval(mut self, poll: Duration) -> Self {
        self.poll = poll.max(Duration::from_millis(1));
        self
    }
}

impl Default for ThreadSleeper {
    fn default() -> Self {
        Self {
            poll: Duration::from_millis(20),
        }
    }
}

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration, interrupt: &Interrupt) -> Result<()> {
        let deadline = Instant::now() + duration;
        loop {
            interrupt.check()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            std::thread::sleep((deadline - now).min(self.poll));
        }
    }
}

/// Enforces a minimum interval between consecutive calls.
#[derive(Debug)]
pub struct Pacer<S> {
    sleeper: S,
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl<S: Sleeper> Pacer<S> {
    pub fn new(sleeper: S, min_interval: Duration) -> Self {
        Self {
            sleeper,
            min_interval,
            last_call: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Time left before the next call may start.
    pub fn remaining(&self) -> Duration {
        match self.last_call {
            Some(last) => self.min_interval.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Block until the next call may start.
    pub fn wait(&mut self, interrupt: &Interrupt) -> Result<()> {
        interrupt.check()?;
        let remaining = self.remaining();
        if !remaining.is_zero() {
            log::trace!("Pacing translation calls: waiting {:?}", remaining);
            self.sleeper.sleep(remaining, interrupt)?;
        }
        Ok(())
    }

    /// Record that a call has just completed.
    pub fn mark(&mut self) {
        self.last_call = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSleeper {
        requests: RefCell<Vec<Duration>>,
    }

    impl Sleeper for RecordingSleeper {
        fn sleep(&self, duration: Duration, _interrupt: &Interrupt) -> Result<()> {
            self.requests.borrow_mut().push(duration);
            Ok(())
        }
    }

    #[test]
    fn test_interrupt_flag_is_shared() {
        let interrupt = Interrupt::new();
        let other = interrupt.clone();
        assert!(interrupt.check().is_ok());
        other.trigger();
        assert!(interrupt.is_triggered());
        assert!(matches!(interrupt.check(), Err(Error::Interrupted)));
        // Observing does not clear it.
        assert!(other.is_triggered());
    }

    #[test]
    fn test_first_call_does_not_wait() {
        let mut pacer = Pacer::new(RecordingSleeper::default(), Duration::from_millis(250));
        pacer.wait(&Interrupt::new()).unwrap();
        assert!(pacer.sleeper.requests.borrow().is_empty());
    }

    #[test]
    fn test_second_call_waits_for_remaining_interval() {
        let mut pacer = Pacer::new(RecordingSleeper::default(), Duration::from_secs(60));
        pacer.mark();
        pacer.wait(&Interrupt::new()).unwrap();
        let requests = pacer.sleeper.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert!(requests[0] > Duration::from_secs(59));
        assert!(requests[0] <= Duration::from_secs(60));
    }

    #[test]
    fn test_zero_interval_never_waits() {
        let mut pacer = Pacer::new(RecordingSleeper::default(), Duration::ZERO);
        pacer.mark();
        pacer.wait(&Interrupt::new()).unwrap();
        assert!(pacer.sleeper.requests.borrow().is_empty());
    }

    #[test]
    fn test_wait_observes_interrupt() {
        let mut pacer = Pacer::new(RecordingSleeper::default(), Duration::ZERO);
        let interrupt = Interrupt::new();
        interrupt.trigger();
        assert!(matches!(pacer.wait(&interrupt), Err(Error::Interrupted)));
    }

    #[test]
    fn test_thread_sleeper_sleeps() {
        let start = Instant::now();
        ThreadSleeper::new()
            .sleep(Duration::from_millis(30), &Interrupt::new())
            .unwrap();
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_thread_sleeper_interrupted() {
        let interrupt = Interrupt::new();
        let trigger = interrupt.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            trigger.trigger();
        });
        let start = Instant::now();
        let result = ThreadSleeper::new()
            .with_poll_interval(Duration::from_millis(5))
            .sleep(Duration::from_secs(10), &interrupt);
        handle.join().unwrap();
        assert!(matches!(result, Err(Error::Interrupted)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
