//! The `Schedule` type and its delay arithmetic.

use std::time::Duration;

/// How long successive aggregation windows stay open.
///
/// Recurrences are counted from zero: `delay_for(0)` is the first window.
/// A schedule with no [`max_recurrences`](Schedule::with_max_recurrences)
/// never runs out.
///
/// ```rust
/// use std::time::Duration;
/// use weir::Schedule;
///
/// let schedule = Schedule::fibonacci(Duration::from_millis(100)).with_max_recurrences(5);
///
/// // 100ms, 100ms, 200ms, 300ms, 500ms, then exhausted
/// assert_eq!(schedule.delay_for(3), Some(Duration::from_millis(300)));
/// assert_eq!(schedule.delay_for(5), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    strategy: Strategy,
    max_recurrences: Option<u32>,
    max_delay: Option<Duration>,
    jitter: Jitter,
}

/// How the window length grows with the recurrence count.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// The same length every time.
    Constant(Duration),
    /// `base * (n + 1)`.
    Linear {
        /// Length of the first window.
        base: Duration,
    },
    /// `base * 2^n`.
    Exponential {
        /// Length of the first window.
        base: Duration,
    },
    /// `base * fib(n + 1)`.
    Fibonacci {
        /// Length of the first window.
        base: Duration,
    },
}

/// Randomness applied on top of the strategy.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Jitter {
    /// Exact delays.
    #[default]
    None,
    /// Up to this fraction above or below the computed delay.
    Proportional(f64),
    /// Anywhere between zero and the computed delay.
    Full,
    /// Between the computed delay and three times the previous one.
    Decorrelated,
}

impl Schedule {
    fn with_strategy(strategy: Strategy) -> Self {
        Self {
            strategy,
            max_recurrences: None,
            max_delay: None,
            jitter: Jitter::None,
        }
    }

    /// Windows of a fixed length.
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use weir::Schedule;
    ///
    /// let schedule = Schedule::constant(Duration::from_millis(50));
    /// assert_eq!(schedule.delay_for(0), Some(Duration::from_millis(50)));
    /// assert_eq!(schedule.delay_for(1_000), Some(Duration::from_millis(50)));
    /// ```
    pub fn constant(delay: Duration) -> Self {
        Self::with_strategy(Strategy::Constant(delay))
    }

    /// Windows growing by `base` each recurrence.
    pub fn linear(base: Duration) -> Self {
        Self::with_strategy(Strategy::Linear { base })
    }

    /// Windows doubling each recurrence.
    pub fn exponential(base: Duration) -> Self {
        Self::with_strategy(Strategy::Exponential { base })
    }

    /// Windows following the Fibonacci sequence.
    pub fn fibonacci(base: Duration) -> Self {
        Self::with_strategy(Strategy::Fibonacci { base })
    }

    /// Run out after `n` recurrences.
    pub fn with_max_recurrences(mut self, n: u32) -> Self {
        self.max_recurrences = Some(n);
        self
    }

    /// Never open a window longer than `d`, jitter included.
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = Some(d);
        self
    }

    /// Randomize each delay by up to `factor` in either direction.
    ///
    /// `factor` is clamped to `0.0..=1.0`. Requires the `jitter` feature.
    pub fn with_jitter(mut self, factor: f64) -> Self {
        self.jitter = Jitter::Proportional(factor.clamp(0.0, 1.0));
        self
    }

    /// Pick each delay uniformly between zero and the computed delay.
    ///
    /// Requires the `jitter` feature.
    pub fn with_full_jitter(mut self) -> Self {
        self.jitter = Jitter::Full;
        self
    }

    /// Pick each delay between the computed delay and three times the
    /// previous one.
    ///
    /// Requires the `jitter` feature.
    pub fn with_decorrelated_jitter(mut self) -> Self {
        self.jitter = Jitter::Decorrelated;
        self
    }

    /// The recurrence bound, if any.
    pub fn max_recurrences(&self) -> Option<u32> {
        self.max_recurrences
    }

    /// The delay cap, if any.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// The growth strategy.
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// The jitter setting.
    pub fn jitter(&self) -> &Jitter {
        &self.jitter
    }

    /// Returns `true` if `delay_for(n)` is `None`.
    pub fn is_exhausted(&self, n: u32) -> bool {
        matches!(self.max_recurrences, Some(max) if n >= max)
    }

    /// Length of window `n` without jitter, or `None` once exhausted.
    pub fn delay_for(&self, n: u32) -> Option<Duration> {
        if self.is_exhausted(n) {
            return None;
        }

        let delay = match &self.strategy {
            Strategy::Constant(d) => *d,
            Strategy::Linear { base } => base.saturating_mul(n.saturating_add(1)),
            Strategy::Exponential { base } => base.saturating_mul(2u32.saturating_pow(n)),
            Strategy::Fibonacci { base } => base.saturating_mul(fibonacci(n.saturating_add(1))),
        };

        Some(self.cap(delay))
    }

    /// Length of window `n` with jitter applied, or `None` once exhausted.
    ///
    /// `prev` is the delay used for the previous window, which decorrelated
    /// jitter builds on.
    pub fn next_delay(&self, n: u32, prev: Option<Duration>) -> Option<Duration> {
        let delay = self.delay_for(n)?;
        Some(self.cap(self.jitter.apply(delay, prev)))
    }

    fn cap(&self, delay: Duration) -> Duration {
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}

impl Jitter {
    /// Randomize `delay`. Without the `jitter` feature this returns `delay`.
    pub fn apply(
        &self,
        delay: Duration,
        #[cfg_attr(not(feature = "jitter"), allow(unused_variables))] prev: Option<Duration>,
    ) -> Duration {
        match self {
            Jitter::None => delay,
            #[cfg(feature = "jitter")]
            Jitter::Proportional(factor) => {
                use rand::Rng;
                let millis = delay.as_millis() as f64;
                let spread = millis * factor;
                let low = (millis - spread).max(0.0);
                let high = millis + spread;
                if high <= low {
                    delay
                } else {
                    Duration::from_millis(rand::rng().random_range(low..=high) as u64)
                }
            }
            #[cfg(feature = "jitter")]
            Jitter::Full => {
                use rand::Rng;
                let max = delay.as_millis() as u64;
                match max {
                    0 => Duration::ZERO,
                    _ => Duration::from_millis(rand::rng().random_range(0..=max)),
                }
            }
            #[cfg(feature = "jitter")]
            Jitter::Decorrelated => {
                use rand::Rng;
                let low = delay.as_millis() as u64;
                let high = prev.unwrap_or(delay).as_millis().saturating_mul(3) as u64;
                if high <= low {
                    delay
                } else {
                    Duration::from_millis(rand::rng().random_range(low..=high))
                }
            }
            #[cfg(not(feature = "jitter"))]
            _ => delay,
        }
    }
}

fn fibonacci(n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    let mut a = 0u32;
    let mut b = 1u32;
    for _ in 1..n {
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    b
}
