use core::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::Backoff;

/// An `f64` stored as its bit pattern in an `AtomicU64`.
#[repr(transparent)]
pub struct AtomicDouble {
    inner: AtomicU64,
}

impl AtomicDouble {
    /// Creates a new atomic double.
    #[inline(always)]
    pub fn new(value: f64) -> Self {
        Self {
            inner: AtomicU64::new(value.to_bits()),
        }
    }

    /// Loads the current value.
    #[inline(always)]
    pub fn load(&self, order: Ordering) -> f64 {
        f64::from_bits(self.inner.load(order))
    }

    /// Stores a new value.
    #[inline(always)]
    pub fn store(&self, value: f64, order: Ordering) {
        self.inner.store(value.to_bits(), order);
    }

    /// Swaps the current value, returning the previous value.
    #[inline(always)]
    pub fn swap(&self, value: f64, order: Ordering) -> f64 {
        f64::from_bits(self.inner.swap(value.to_bits(), order))
    }

    /// Replaces the value with `f(current)` using a CAS loop and returns the new value.
    ///
    /// `f` may run more than once under contention.
    #[inline]
    pub fn update(&self, mut f: impl FnMut(f64) -> f64) -> f64 {
        let backoff = Backoff::new();
        let mut current = self.inner.load(Ordering::Acquire);
        loop {
            let next = f(f64::from_bits(current)).to_bits();
            match self
                .inner
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return f64::from_bits(next),
                Err(actual) => {
                    current = actual;
                    backoff.spin();
                }
            }
        }
    }
}

impl Default for AtomicDouble {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl core::fmt::Debug for AtomicDouble {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("AtomicDouble")
            .field(&self.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn update_is_linearizable_under_contention() {
        let sum = Arc::new(AtomicDouble::new(0.0));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sum = Arc::clone(&sum);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        sum.update(|v| v + 1.0);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(sum.load(Ordering::SeqCst), 4_000.0);
    }

    #[test]
    fn swap_returns_previous() {
        let d = AtomicDouble::new(1.5);
        assert_eq!(d.swap(-2.0, Ordering::Relaxed), 1.5);
        assert_eq!(d.load(Ordering::Relaxed), -2.0);
    }
}
