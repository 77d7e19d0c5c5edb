use core::fmt;
use core::ops::Add;

/// An inclusive range of byte counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MemoryRange {
    min: usize,
    max: usize,
}

impl MemoryRange {
    /// An empty range.
    pub const ZERO: Self = Self { min: 0, max: 0 };

    /// A range of exactly `bytes`.
    pub const fn of(bytes: usize) -> Self {
        Self {
            min: bytes,
            max: bytes,
        }
    }

    /// A range from `min` to `max` bytes.
    ///
    /// # Panics
    /// Panics if `min > max`.
    pub fn between(min: usize, max: usize) -> Self {
        assert!(min <= max, "min {min} exceeds max {max}");
        Self { min, max }
    }

    /// Lower bound.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Upper bound.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Scales both bounds, saturating at `usize::MAX`.
    #[must_use]
    pub fn times(self, factor: usize) -> Self {
        Self {
            min: self.min.saturating_mul(factor),
            max: self.max.saturating_mul(factor),
        }
    }
}

impl From<usize> for MemoryRange {
    fn from(bytes: usize) -> Self {
        Self::of(bytes)
    }
}

impl Add for MemoryRange {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            min: self.min.saturating_add(rhs.min),
            max: self.max.saturating_add(rhs.max),
        }
    }
}

impl core::iter::Sum for MemoryRange {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for MemoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", human_bytes(self.min))
        } else {
            write!(f, "[{} ... {}]", human_bytes(self.min), human_bytes(self.max))
        }
    }
}

fn human_bytes(bytes: usize) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} Bytes")
    } else {
        format!("{value:.0} {}", UNITS[unit])
    }
}
